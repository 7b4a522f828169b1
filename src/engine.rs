//! The tree-edit engine.
//!
//! [`GoEngine`] owns a [`Cursor`] over one game tree and is the only way the
//! tree is navigated or changed during an edit session. Besides moving the
//! cursor it keeps a stack of bookmarks (see [`crate::path`]) and calls the
//! registered event handlers, in registration order, inline with the
//! operation that caused the event.
//!
//! Handlers receive the engine itself and may call any operation. A
//! navigation handler must leave the cursor on the node it found it on;
//! bookmark bookkeeping depends on it and it is not checked. Events raised by
//! a handler's own operations reach every other handler but not the one
//! raising them, which is still running. A handler registered while an event
//! is being dispatched first runs on the next event.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::common::{insert_at, replace_or_push, while_ok};
use crate::constants::COMMENT_PROPERTY;
use crate::cursor::{Cursor, CursorError};
use crate::game_info::GameInfo;
use crate::node::Node;
use crate::path::{PathStack, Step};
use crate::property::Property;
use crate::values::{Color, Coord, Move, Text};

/// Failure of an engine operation.
///
/// Every variant except [`EngineError::Handler`] and
/// [`EngineError::Invariant`] is a precondition violation reported before the
/// engine changes any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot go up from the root node")]
    AtRoot,
    #[error("node has no child {index} (it has {count})")]
    NoSuchChild { index: usize, count: usize },
    #[error("the position stack is empty")]
    EmptyPathStack,
    #[error("the saved position can no longer be reached")]
    InvalidBookmark,
    #[error("cannot add a child at index {index}; the node has {count} children")]
    ChildIndexOutOfRange { index: usize, count: usize },
    #[error("game info changes may not change the board size")]
    RootInfoModified,
    #[error("illegal move: {color:?} at {coord}")]
    IllegalMove { color: Color, coord: Coord },
    #[error("event handler failed: {0}")]
    Handler(String),
    #[error("internal engine error: {0}")]
    Invariant(String),
}

impl From<CursorError> for EngineError {
    fn from(e: CursorError) -> Self {
        match e {
            CursorError::AtRoot => EngineError::AtRoot,
            CursorError::NoSuchChild { index, count } => EngineError::NoSuchChild { index, count },
        }
    }
}

pub type HandlerResult = Result<(), EngineError>;

pub type ChildAddedHandler = Rc<RefCell<dyn FnMut(&mut GoEngine, usize) -> HandlerResult>>;
pub type GameInfoChangedHandler =
    Rc<RefCell<dyn FnMut(&mut GoEngine, &GameInfo, &GameInfo) -> HandlerResult>>;
pub type NavigationHandler = Rc<RefCell<dyn FnMut(&mut GoEngine, Step) -> HandlerResult>>;
pub type PropertiesChangedHandler =
    Rc<RefCell<dyn FnMut(&mut GoEngine, &[Property], &[Property]) -> HandlerResult>>;

/// The kinds of events an engine fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A child was inserted under the current node.
    ChildAdded,
    /// The game info in effect at the cursor changed, by navigation or edit.
    GameInfoChanged,
    /// The cursor took one step up or down.
    Navigation,
    /// The current node's property list was replaced.
    PropertiesChanged,
}

/// An event handler, tagged with the event it listens to.
pub enum Handler {
    /// Called with the new child's index. The cursor is still on the parent;
    /// `engine.cursor().child(index)` gives a cursor at the child.
    ChildAdded(ChildAddedHandler),
    /// Called with the old and new game info.
    GameInfoChanged(GameInfoChangedHandler),
    /// Called with the step taken.
    Navigation(NavigationHandler),
    /// Called with the old and new property lists.
    PropertiesChanged(PropertiesChangedHandler),
}

impl Handler {
    pub fn child_added(f: impl FnMut(&mut GoEngine, usize) -> HandlerResult + 'static) -> Self {
        Handler::ChildAdded(Rc::new(RefCell::new(f)))
    }

    pub fn game_info_changed(
        f: impl FnMut(&mut GoEngine, &GameInfo, &GameInfo) -> HandlerResult + 'static,
    ) -> Self {
        Handler::GameInfoChanged(Rc::new(RefCell::new(f)))
    }

    pub fn navigation(f: impl FnMut(&mut GoEngine, Step) -> HandlerResult + 'static) -> Self {
        Handler::Navigation(Rc::new(RefCell::new(f)))
    }

    pub fn properties_changed(
        f: impl FnMut(&mut GoEngine, &[Property], &[Property]) -> HandlerResult + 'static,
    ) -> Self {
        Handler::PropertiesChanged(Rc::new(RefCell::new(f)))
    }

    pub fn event(&self) -> Event {
        match self {
            Handler::ChildAdded(_) => Event::ChildAdded,
            Handler::GameInfoChanged(_) => Event::GameInfoChanged,
            Handler::Navigation(_) => Event::Navigation,
            Handler::PropertiesChanged(_) => Event::PropertiesChanged,
        }
    }
}

#[derive(Default)]
struct Handlers {
    child_added: Vec<ChildAddedHandler>,
    game_info_changed: Vec<GameInfoChangedHandler>,
    navigation: Vec<NavigationHandler>,
    properties_changed: Vec<PropertiesChangedHandler>,
}

/// Run the handlers registered in `$list` when the event fired, skipping any
/// that is already running further up the stack.
macro_rules! dispatch {
    ($engine:ident, $list:ident, |$handler:ident, $e:ident| $call:expr) => {{
        let snapshot = $engine.handlers.$list.clone();
        trace!(event = stringify!($list), handlers = snapshot.len(), "dispatch");
        for cell in &snapshot {
            let Ok(mut running) = cell.try_borrow_mut() else {
                trace!(event = stringify!($list), "handler already running, skipped");
                continue;
            };
            let $handler = &mut *running;
            let $e = &mut *$engine;
            $call?;
        }
        Ok(())
    }};
}

/// Edit session over one game tree.
pub struct GoEngine {
    cursor: Cursor,
    path_stack: PathStack,
    handlers: Handlers,
}

impl GoEngine {
    /// An engine with the cursor at the root of `root`.
    pub fn new(root: Node) -> Self {
        Self::from_cursor(Cursor::new(root))
    }

    pub fn from_cursor(cursor: Cursor) -> Self {
        Self {
            cursor,
            path_stack: PathStack::new(),
            handlers: Handlers::default(),
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn path_stack(&self) -> &PathStack {
        &self.path_stack
    }

    /// A copy of the whole tree as edited so far.
    pub fn root_node(&self) -> Node {
        self.cursor.root_node()
    }

    /// End the session and give back the tree.
    pub fn into_root(self) -> Node {
        self.cursor.into_root()
    }

    /// Register a handler. Handlers of one kind run in registration order.
    pub fn on(&mut self, handler: Handler) {
        trace!(event = ?handler.event(), "register handler");
        match handler {
            Handler::ChildAdded(h) => self.handlers.child_added.push(h),
            Handler::GameInfoChanged(h) => self.handlers.game_info_changed.push(h),
            Handler::Navigation(h) => self.handlers.navigation.push(h),
            Handler::PropertiesChanged(h) => self.handlers.properties_changed.push(h),
        }
    }

    fn fire_child_added(&mut self, index: usize) -> HandlerResult {
        dispatch!(self, child_added, |h, engine| h(engine, index))
    }

    fn fire_game_info_changed(&mut self, old: &GameInfo, new: &GameInfo) -> HandlerResult {
        dispatch!(self, game_info_changed, |h, engine| h(engine, old, new))
    }

    fn fire_navigation(&mut self, step: Step) -> HandlerResult {
        dispatch!(self, navigation, |h, engine| h(engine, step))
    }

    fn fire_properties_changed(&mut self, old: &[Property], new: &[Property]) -> HandlerResult {
        dispatch!(self, properties_changed, |h, engine| h(engine, old, new))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn go_up(&mut self) -> Result<(), EngineError> {
        let index = self.cursor.child_index().ok_or(EngineError::AtRoot)?;
        let old_info = self
            .cursor
            .node()
            .has_game_info()
            .then(|| self.cursor.game_info());

        self.cursor.go_up()?;
        let step = Step::GoUp(index);
        self.path_stack.record(step);
        debug!(index, depth = self.cursor.depth(), "go up");
        self.fire_navigation(step)?;

        if let Some(old) = old_info {
            let new = self.cursor.game_info();
            self.fire_game_info_changed(&old, &new)?;
        }
        Ok(())
    }

    pub fn go_down(&mut self, index: usize) -> Result<(), EngineError> {
        let children = &self.cursor.node().children;
        let child = children.get(index).ok_or(EngineError::NoSuchChild {
            index,
            count: children.len(),
        })?;
        let old_info = child.has_game_info().then(|| self.cursor.game_info());

        self.cursor.go_down(index)?;
        let step = Step::GoDown(index);
        self.path_stack.record(step);
        debug!(index, depth = self.cursor.depth(), "go down");
        self.fire_navigation(step)?;

        if let Some(old) = old_info {
            let new = self.cursor.game_info();
            self.fire_game_info_changed(&old, &new)?;
        }
        Ok(())
    }

    fn take_step(&mut self, step: Step) -> Result<(), EngineError> {
        match step {
            Step::GoUp(_) => self.go_up(),
            Step::GoDown(i) => self.go_down(i),
        }
    }

    /// Go up to the root, one step (and one navigation event) at a time.
    pub fn go_to_root(&mut self) -> Result<(), EngineError> {
        while_ok(|| {
            if !self.cursor.has_parent() {
                return Ok(false);
            }
            self.go_up()?;
            Ok(true)
        })
    }

    /// Walk up to the nearest node with game-info properties.
    ///
    /// Returns whether one was found. If none is, the cursor stays at the root
    /// when `go_to_root_if_not_found` is set, and returns to where it started
    /// otherwise.
    pub fn go_to_game_info_node(
        &mut self,
        go_to_root_if_not_found: bool,
    ) -> Result<bool, EngineError> {
        self.with_bookmark(|engine| loop {
            if engine.cursor.node().has_game_info() {
                engine.drop_position()?;
                return Ok(true);
            }
            if !engine.cursor.has_parent() {
                if go_to_root_if_not_found {
                    engine.drop_position()?;
                } else {
                    engine.pop_position()?;
                }
                return Ok(false);
            }
            engine.go_up()?;
        })
    }

    // =========================================================================
    // Bookmarks
    // =========================================================================

    /// Remember the current position.
    pub fn push_position(&mut self) {
        self.path_stack.push();
        debug!(bookmarks = self.path_stack.len(), "push position");
    }

    /// Walk back to the most recently pushed position and forget it.
    ///
    /// The whole walk is checked first, so a bookmark made unreachable by
    /// edits fails without moving the cursor.
    pub fn pop_position(&mut self) -> Result<(), EngineError> {
        let steps: Vec<Step> = self
            .path_stack
            .top_steps()
            .ok_or(EngineError::EmptyPathStack)?
            .collect();
        if !self.cursor.can_walk(steps.iter().copied()) {
            return Err(EngineError::InvalidBookmark);
        }
        debug!(steps = steps.len(), "pop position");

        // Each step taken cancels itself off the top bookmark.
        while_ok(|| {
            let Some(step) = self.path_stack.next_step() else {
                return Ok(false);
            };
            let before = self.path_stack.top_len();
            self.take_step(step)?;
            if self.path_stack.top_len() >= before {
                return Err(EngineError::Invariant(format!(
                    "step {step} did not shorten the top bookmark"
                )));
            }
            Ok(true)
        })?;
        self.path_stack.pop();
        Ok(())
    }

    /// Run `f` under a new bookmark that `f` pops or drops itself. If `f`
    /// fails, whatever bookmarks it left above the ones already there are
    /// dropped where the cursor stands.
    fn with_bookmark<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let depth = self.path_stack.len();
        self.push_position();
        let result = f(self);
        if result.is_err() {
            while self.path_stack.len() > depth && self.path_stack.drop_top() {}
            debug!(bookmarks = self.path_stack.len(), "dropped bookmarks after failure");
        }
        result
    }

    /// Forget the most recently pushed position without moving.
    pub fn drop_position(&mut self) -> Result<(), EngineError> {
        if !self.path_stack.drop_top() {
            return Err(EngineError::EmptyPathStack);
        }
        debug!(bookmarks = self.path_stack.len(), "drop position");
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn get_properties(&self) -> &[Property] {
        self.cursor.properties()
    }

    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.cursor.node().property(name)
    }

    /// Replace the current node's property list with `f(old)`.
    pub fn modify_properties(
        &mut self,
        f: impl FnOnce(&[Property]) -> Vec<Property>,
    ) -> Result<(), EngineError> {
        let old = self.cursor.properties().to_vec();
        let new = f(&old);

        let info_of = |props: &[Property]| -> Vec<Property> {
            props.iter().filter(|p| p.is_game_info()).cloned().collect()
        };
        let old_info = (info_of(&old) != info_of(&new)).then(|| self.cursor.game_info());

        self.cursor.modify_node(|n| n.properties = new.clone());
        trace!(old = old.len(), new = new.len(), "modify properties");
        self.fire_properties_changed(&old, &new)?;

        if let Some(old_info) = old_info {
            let new_info = self.cursor.game_info();
            self.fire_game_info_changed(&old_info, &new_info)?;
        }
        Ok(())
    }

    /// Remove every property matching `pred`.
    pub fn delete_properties(&mut self, pred: impl Fn(&Property) -> bool) -> Result<(), EngineError> {
        self.modify_properties(|props| props.iter().filter(|p| !pred(p)).cloned().collect())
    }

    /// Set a property, replacing one of the same name in place.
    pub fn put_property(&mut self, property: Property) -> Result<(), EngineError> {
        self.modify_properties(|props| {
            let mut props = props.to_vec();
            let name = property.name().to_string();
            replace_or_push(&mut props, property, |p| p.name() == name);
            props
        })
    }

    pub fn delete_property(&mut self, name: &str) -> Result<(), EngineError> {
        self.delete_properties(|p| p.name() == name)
    }

    /// Rewrite the game info in effect at the cursor.
    ///
    /// The info is written to the nearest game-info node, or to the root if
    /// there is none. The cursor ends where it started. Returns the new info.
    pub fn modify_game_info(
        &mut self,
        f: impl FnOnce(GameInfo) -> GameInfo,
    ) -> Result<GameInfo, EngineError> {
        let info = self.cursor.game_info();
        let new_info = f(info.clone());
        if new_info.root_info != info.root_info {
            return Err(EngineError::RootInfoModified);
        }

        if new_info == info {
            trace!("game info unchanged");
            return Ok(new_info);
        }

        // Existing game-info properties are rewritten in place; new ones go last.
        let mut info_props = new_info.to_properties();
        self.with_bookmark(|engine| {
            engine.go_to_game_info_node(true)?;
            engine.modify_properties(|props| {
                let mut out = Vec::with_capacity(props.len() + info_props.len());
                for p in props {
                    if !p.is_game_info() {
                        out.push(p.clone());
                    } else if let Some(i) = info_props.iter().position(|n| n.name() == p.name()) {
                        out.push(info_props.remove(i));
                    }
                }
                out.append(&mut info_props);
                out
            })?;
            engine.pop_position()
        })?;
        Ok(new_info)
    }

    /// Rewrite the current node's comment. An empty result removes it.
    pub fn modify_comment(&mut self, f: impl FnOnce(&str) -> String) -> Result<(), EngineError> {
        let old = match self.cursor.node().property(COMMENT_PROPERTY) {
            Some(Property::C(text)) => Some(text.clone()),
            _ => None,
        };
        let new = Text::new(&f(old.as_ref().map(Text::as_str).unwrap_or("")));
        match old {
            None if new.is_empty() => Ok(()),
            Some(_) if new.is_empty() => self.delete_property(COMMENT_PROPERTY),
            Some(old) if old == new => Ok(()),
            _ => self.put_property(Property::C(new)),
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Insert `node` as child `index` of the current node.
    pub fn add_child(&mut self, index: usize, node: Node) -> Result<(), EngineError> {
        let count = self.cursor.child_count();
        let mut inserted = false;
        self.cursor
            .modify_node(|n| inserted = insert_at(&mut n.children, index, node).is_ok());
        if !inserted {
            return Err(EngineError::ChildIndexOutOfRange { index, count });
        }
        self.path_stack.shift_for_insert(index);
        debug!(index, children = count + 1, "add child");
        self.fire_child_added(index)
    }

    pub fn add_child_at_end(&mut self, node: Node) -> Result<(), EngineError> {
        self.add_child(self.cursor.child_count(), node)
    }

    /// Play a move from the current node and move to it.
    ///
    /// An existing child with exactly this move is reused; otherwise a new
    /// last child is added. Stone moves must be legal on the current board.
    pub fn play_move(&mut self, color: Color, mv: Move) -> Result<(), EngineError> {
        if let Move::Play(coord) = mv {
            if !self.cursor.board().is_legal_move(color, coord) {
                return Err(EngineError::IllegalMove { color, coord });
            }
        }
        let property = Property::play(color, mv);
        let existing = self
            .cursor
            .node()
            .children
            .iter()
            .position(|child| child.properties.contains(&property));
        match existing {
            Some(i) => self.go_down(i),
            None => {
                let index = self.cursor.child_count();
                self.add_child(index, Node::with_properties(vec![property]))?;
                self.go_down(index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::values::SimpleText;

    fn mv(color: Color, s: &str) -> Node {
        Node::with_properties(vec![Property::play(
            color,
            Move::Play(Coord::from_sgf(s).unwrap()),
        )])
    }

    /// Root with children [aa, bb, cc]; bb has one child dd.
    fn engine() -> GoEngine {
        let mut root = Node::root(9, 9);
        let mut b = mv(Color::Black, "bb");
        b.add_child(mv(Color::White, "dd"));
        root.add_child(mv(Color::Black, "aa"));
        root.add_child(b);
        root.add_child(mv(Color::Black, "cc"));
        GoEngine::new(root)
    }

    fn log_navigation(engine: &mut GoEngine) -> Rc<RefCell<Vec<Step>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        engine.on(Handler::navigation(move |_, step| {
            sink.borrow_mut().push(step);
            Ok(())
        }));
        log
    }

    #[test]
    fn test_go_up_at_root_fails() {
        let mut e = engine();
        assert_eq!(e.go_up(), Err(EngineError::AtRoot));
        assert_eq!(
            e.go_down(3),
            Err(EngineError::NoSuchChild { index: 3, count: 3 })
        );
    }

    #[test]
    fn test_go_to_root_fires_each_step() {
        let mut e = engine();
        e.go_down(1).unwrap();
        e.go_down(0).unwrap();
        let log = log_navigation(&mut e);
        e.go_to_root().unwrap();
        assert_eq!(*log.borrow(), vec![Step::GoUp(0), Step::GoUp(1)]);
        assert!(!e.cursor().has_parent());
    }

    #[test]
    fn test_push_pop_returns_to_saved_node() {
        let mut e = engine();
        e.go_down(1).unwrap();
        e.push_position();
        e.go_up().unwrap();
        e.go_down(2).unwrap();
        e.pop_position().unwrap();
        assert_eq!(e.cursor().path(), vec![1]);
        assert!(e.path_stack().is_empty());
        assert_eq!(e.pop_position(), Err(EngineError::EmptyPathStack));
        assert_eq!(e.drop_position(), Err(EngineError::EmptyPathStack));
    }

    #[test]
    fn test_drop_keeps_older_bookmark_valid() {
        let mut e = engine();
        e.push_position();
        e.go_down(1).unwrap();
        e.push_position();
        e.go_down(0).unwrap();
        e.drop_position().unwrap();
        e.go_up().unwrap();
        e.go_up().unwrap();
        e.go_down(0).unwrap();
        e.pop_position().unwrap();
        assert_eq!(e.cursor().path(), Vec::<usize>::new());
    }

    #[test]
    fn test_add_child_renumbers_bookmarks() {
        let mut e = engine();
        e.go_down(2).unwrap();
        e.push_position();
        e.go_up().unwrap();
        e.add_child(0, Node::new()).unwrap();
        e.add_child(4, Node::new()).unwrap();
        e.pop_position().unwrap();
        assert_eq!(e.cursor().path(), vec![3]);
        assert!(e.cursor().node().has_property("B"));
    }

    #[test]
    fn test_add_child_out_of_range() {
        let mut e = engine();
        assert_eq!(
            e.add_child(4, Node::new()),
            Err(EngineError::ChildIndexOutOfRange { index: 4, count: 3 })
        );
        assert_eq!(e.cursor().child_count(), 3);
    }

    #[test]
    fn test_child_added_event() {
        let mut e = engine();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        e.on(Handler::child_added(move |engine, index| {
            let child = engine.cursor().child(index).unwrap();
            sink.borrow_mut().push((index, engine.cursor().depth(), child.node().clone()));
            Ok(())
        }));
        let node = mv(Color::White, "ee");
        e.add_child(1, node.clone()).unwrap();
        assert_eq!(*seen.borrow(), vec![(1, 0, node)]);
        assert_eq!(e.cursor().depth(), 0);
    }

    #[test]
    fn test_edits_made_by_a_handler_reach_the_other_handlers() {
        let mut e = engine();
        let first_calls = Rc::new(RefCell::new(0));
        let calls = Rc::clone(&first_calls);
        e.on(Handler::properties_changed(move |engine, _, _| {
            *calls.borrow_mut() += 1;
            if *calls.borrow() == 1 {
                engine.modify_comment(|_| "annotated".to_string())?;
            }
            Ok(())
        }));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        e.on(Handler::properties_changed(move |_, _, new| {
            sink.borrow_mut().push(new.len());
            Ok(())
        }));

        e.put_property(Property::N(SimpleText::new("start"))).unwrap();
        // The comment edit is seen first, from inside the outer dispatch.
        assert_eq!(*seen.borrow(), vec![5, 4]);
        assert_eq!(e.get_properties().len(), 5);
        // The editing handler is not re-entered by its own edit.
        assert_eq!(*first_calls.borrow(), 1);
    }

    #[test]
    fn test_failed_game_info_walk_leaves_no_bookmark() {
        let mut e = engine();
        e.go_down(1).unwrap();
        e.go_down(0).unwrap();
        e.push_position();
        e.on(Handler::navigation(|_, step| match step {
            Step::GoUp(_) => Err(EngineError::Handler("no climbing".into())),
            Step::GoDown(_) => Ok(()),
        }));

        assert!(e.go_to_game_info_node(true).is_err());
        assert_eq!(e.path_stack().len(), 1);
        let err = e.modify_game_info(|mut info| {
            info.black_name = Some(SimpleText::new("Jowa"));
            info
        });
        assert_eq!(err, Err(EngineError::Handler("no climbing".into())));
        assert_eq!(e.path_stack().len(), 1);
    }

    #[test]
    fn test_modify_game_info_keeps_property_order() {
        let mut root = Node::root(9, 9);
        root.properties.push(Property::PB(SimpleText::new("Black")));
        root.properties.push(Property::C(Text::new("note")));
        root.properties.push(Property::PW(SimpleText::new("White")));
        let mut e = GoEngine::new(root);
        let changes = Rc::new(RefCell::new(0));
        let c = Rc::clone(&changes);
        e.on(Handler::properties_changed(move |_, _, _| {
            *c.borrow_mut() += 1;
            Ok(())
        }));

        let before = e.get_properties().to_vec();
        e.modify_game_info(|info| info).unwrap();
        assert_eq!(e.get_properties(), before.as_slice());
        assert_eq!(*changes.borrow(), 0);

        e.modify_game_info(|mut info| {
            info.black_name = Some(SimpleText::new("Kuwabara"));
            info.white_name = None;
            info.game_name = Some(SimpleText::new("Ear-reddening"));
            info
        })
        .unwrap();
        let names: Vec<&str> = e.get_properties().iter().map(Property::name).collect();
        assert_eq!(names, vec!["FF", "GM", "SZ", "PB", "C", "GN"]);
        assert_eq!(
            e.get_property("PB"),
            Some(&Property::PB(SimpleText::new("Kuwabara")))
        );
        assert_eq!(*changes.borrow(), 1);
    }

    #[test]
    fn test_modify_properties_events() {
        let mut e = engine();
        let changes = Rc::new(RefCell::new(0));
        let info_changes = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&changes);
        e.on(Handler::properties_changed(move |_, old, new| {
            assert_ne!(old.len(), new.len());
            *c.borrow_mut() += 1;
            Ok(())
        }));
        let i = Rc::clone(&info_changes);
        e.on(Handler::game_info_changed(move |_, old, new| {
            i.borrow_mut().push((old.black_name.clone(), new.black_name.clone()));
            Ok(())
        }));

        e.put_property(Property::C(Text::new("note"))).unwrap();
        assert_eq!(*changes.borrow(), 1);
        assert!(info_changes.borrow().is_empty());

        e.put_property(Property::PB(SimpleText::new("Honinbo"))).unwrap();
        assert_eq!(*changes.borrow(), 2);
        assert_eq!(
            *info_changes.borrow(),
            vec![(None, Some(SimpleText::new("Honinbo")))]
        );
    }

    #[test]
    fn test_modify_comment() {
        let mut e = engine();
        e.modify_comment(|_| String::new()).unwrap();
        assert!(e.get_property("C").is_none());

        e.modify_comment(|old| format!("{old}foo")).unwrap();
        assert_eq!(e.get_property("C"), Some(&Property::C(Text::new("foo"))));

        e.modify_comment(|old| format!("{old}bar")).unwrap();
        assert_eq!(e.get_property("C"), Some(&Property::C(Text::new("foobar"))));

        e.modify_comment(|_| String::new()).unwrap();
        assert!(e.get_property("C").is_none());
    }

    #[test]
    fn test_go_to_game_info_node() {
        let mut e = engine();
        e.go_down(1).unwrap();
        e.go_down(0).unwrap();
        assert!(!e.go_to_game_info_node(false).unwrap());
        assert_eq!(e.cursor().path(), vec![1, 0]);
        assert!(!e.go_to_game_info_node(true).unwrap());
        assert_eq!(e.cursor().depth(), 0);

        e.go_down(1).unwrap();
        e.put_property(Property::GN(SimpleText::new("branch"))).unwrap();
        e.go_down(0).unwrap();
        assert!(e.go_to_game_info_node(false).unwrap());
        assert_eq!(e.cursor().path(), vec![1]);
        assert!(e.path_stack().is_empty());
    }

    #[test]
    fn test_modify_game_info_writes_to_root_and_returns() {
        let mut e = engine();
        e.go_down(1).unwrap();
        e.go_down(0).unwrap();
        let info = e
            .modify_game_info(|mut info| {
                info.white_name = Some(SimpleText::new("Dosaku"));
                info
            })
            .unwrap();
        assert_eq!(info.white_name, Some(SimpleText::new("Dosaku")));
        assert_eq!(e.cursor().path(), vec![1, 0]);
        assert!(e.root_node().has_property("PW"));

        let err = e.modify_game_info(|mut info| {
            info.root_info.width = 13;
            info
        });
        assert_eq!(err, Err(EngineError::RootInfoModified));
    }

    #[test]
    fn test_play_move_reuses_existing_child() {
        let mut e = engine();
        e.play_move(Color::Black, Move::Play(Coord::new(1, 1))).unwrap();
        assert_eq!(e.cursor().path(), vec![1]);
        e.go_up().unwrap();

        e.play_move(Color::Black, Move::Play(Coord::new(4, 4))).unwrap();
        assert_eq!(e.cursor().path(), vec![3]);
        e.go_up().unwrap();
        e.go_down(1).unwrap();

        let err = e.play_move(Color::White, Move::Play(Coord::new(1, 1)));
        assert!(matches!(err, Err(EngineError::IllegalMove { .. })));
        e.play_move(Color::White, Move::Pass).unwrap();
        assert_eq!(e.cursor().path(), vec![1, 1]);
    }

    #[test]
    fn test_navigation_handler_may_navigate_back() {
        let mut e = engine();
        e.on(Handler::navigation(|engine, step| {
            // Peek at the first child and come back.
            if matches!(step, Step::GoDown(1)) && engine.cursor().child_count() > 0 {
                engine.go_down(0)?;
                engine.go_up()?;
            }
            Ok(())
        }));
        e.push_position();
        e.go_down(1).unwrap();
        assert_eq!(e.cursor().path(), vec![1]);
        e.pop_position().unwrap();
        assert_eq!(e.cursor().depth(), 0);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut e = engine();
        e.on(Handler::navigation(|_, _| Err(EngineError::Handler("refused".into()))));
        assert_eq!(e.go_down(0), Err(EngineError::Handler("refused".into())));
    }
}
