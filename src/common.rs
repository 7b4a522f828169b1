//! Small list, result, and loop helpers shared by the parser and the engine.

/// Replace the first element matching `pred` with `item`, or append `item`.
///
/// Returns the replaced element, if any. Keeps the position of the replaced
/// element so property lists stay in their original order.
pub fn replace_or_push<T>(list: &mut Vec<T>, item: T, pred: impl Fn(&T) -> bool) -> Option<T> {
    match list.iter().position(pred) {
        Some(i) => Some(std::mem::replace(&mut list[i], item)),
        None => {
            list.push(item);
            None
        }
    }
}

/// Remove every element matching `pred`, returning how many were removed.
pub fn remove_where<T>(list: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> usize {
    let before = list.len();
    list.retain(|x| !pred(x));
    before - list.len()
}

/// Insert `item` at `index`, shifting later elements. Out of range is an error
/// carrying the item back.
pub fn insert_at<T>(list: &mut Vec<T>, index: usize, item: T) -> Result<(), T> {
    if index > list.len() {
        return Err(item);
    }
    list.insert(index, item);
    Ok(())
}

/// Collect every success, or every failure if there was at least one.
///
/// Unlike `collect::<Result<Vec<_>, _>>()` this does not stop at the first
/// error.
pub fn and_results<T, E>(results: impl IntoIterator<Item = Result<T, E>>) -> Result<Vec<T>, Vec<E>> {
    let mut oks = Vec::new();
    let mut errs = Vec::new();
    for r in results {
        match r {
            Ok(x) => oks.push(x),
            Err(e) => errs.push(e),
        }
    }
    if errs.is_empty() { Ok(oks) } else { Err(errs) }
}

/// Run `body` until it returns `Ok(false)` or an error.
pub fn while_ok<E>(mut body: impl FnMut() -> Result<bool, E>) -> Result<(), E> {
    while body()? {}
    Ok(())
}
