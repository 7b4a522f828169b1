//! Property value types and their SGF sub-grammars.
//!
//! Every property carries a value of one of the types in this module. Each
//! type implements [`Value`], which parses the raw bracketed strings of one
//! property and renders them back. Raw strings are the text between `[` and
//! `]` with escapes still in place, so composed values can be split on an
//! unescaped `:` before the halves are decoded.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::bigfloat::BigFloat;
use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// Parse result for a value: the error is a human-readable expectation.
pub type ValueResult<T> = Result<T, String>;

/// A property value type: how to read all of a property's bracketed values,
/// and how to write them back.
pub trait Value: Sized {
    fn parse_values(raw: &[String]) -> ValueResult<Self>;
    fn render_values(&self, out: &mut String);
}

// =============================================================================
// Text escaping
// =============================================================================

/// Split a raw value on its first unescaped `:`.
pub fn split_composed(raw: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ':' => return Some((&raw[..i], &raw[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Remove escapes and soft line breaks, then normalize whitespace.
///
/// In Text (`keep_newlines`) line breaks survive as `\n`; in SimpleText they
/// become spaces. Every other whitespace character becomes a space.
pub fn decode_text(raw: &str, keep_newlines: bool) -> String {
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            // Soft line break: `\` followed by any newline sequence.
            Some(n @ ('\n' | '\r')) => {
                let other = if n == '\n' { '\r' } else { '\n' };
                if chars.peek() == Some(&other) {
                    chars.next();
                }
            }
            Some(e) => unescaped.push(e),
            None => {}
        }
    }
    normalize_whitespace(&unescaped, keep_newlines)
}

/// Fold newline sequences (`\n`, `\r`, `\r\n`, `\n\r`) into one break and
/// replace other whitespace with a space.
pub fn normalize_whitespace(s: &str, keep_newlines: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' | '\r' => {
                let other = if c == '\n' { '\r' } else { '\n' };
                if chars.peek() == Some(&other) {
                    chars.next();
                }
                out.push(if keep_newlines { '\n' } else { ' ' });
            }
            c if c.is_whitespace() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Escape `\` and `]`, and `:` when the text is half of a composed value.
pub fn encode_text(s: &str, composed: bool, out: &mut String) {
    for c in s.chars() {
        if c == '\\' || c == ']' || (composed && c == ':') {
            out.push('\\');
        }
        out.push(c);
    }
}

fn single<'a>(raw: &'a [String], expected: &str) -> ValueResult<&'a str> {
    match raw {
        [one] => Ok(one.as_str()),
        _ => Err(format!("a single {expected} value")),
    }
}

fn bracket(out: &mut String, f: impl FnOnce(&mut String)) {
    out.push('[');
    f(out);
    out.push(']');
}

// =============================================================================
// Scalars
// =============================================================================

/// Properties without a value (`KO[]`, `DO[]`, `IT[]`).
impl Value for () {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        match single(raw, "empty")?.trim() {
            "" => Ok(()),
            _ => Err("an empty value".into()),
        }
    }

    fn render_values(&self, out: &mut String) {
        out.push_str("[]");
    }
}

fn parse_number(raw: &str) -> ValueResult<i64> {
    let s = raw.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("a number (got {s:?})"));
    }
    s.parse::<i64>().map_err(|_| format!("a number in range (got {s:?})"))
}

/// SGF Number.
impl Value for i64 {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        parse_number(single(raw, "number")?)
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| o.push_str(&self.to_string()));
    }
}

/// SGF Real.
impl Value for BigFloat {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        let s = single(raw, "real number")?.trim();
        s.parse().map_err(|e| format!("a real number ({e})"))
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| o.push_str(&self.to_string()));
    }
}

/// Stone or player color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    pub fn from_letter(s: &str) -> Option<Color> {
        match s {
            "B" => Some(Color::Black),
            "W" => Some(Color::White),
            _ => None,
        }
    }
}

impl Value for Color {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        let s = single(raw, "color")?.trim();
        Color::from_letter(s).ok_or_else(|| format!("a color B or W (got {s:?})"))
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| o.push(self.letter()));
    }
}

/// SGF Double: emphasis of an annotation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Double {
    Normal,
    Emphasized,
}

impl Value for Double {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        match single(raw, "double")?.trim() {
            "1" => Ok(Double::Normal),
            "2" => Ok(Double::Emphasized),
            s => Err(format!("a double 1 or 2 (got {s:?})")),
        }
    }

    fn render_values(&self, out: &mut String) {
        let c = match self {
            Double::Normal => '1',
            Double::Emphasized => '2',
        };
        bracket(out, |o| o.push(c));
    }
}

// =============================================================================
// Text
// =============================================================================

/// Single-line text. Line breaks and other whitespace are spaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SimpleText(String);

impl SimpleText {
    pub fn new(s: &str) -> Self {
        Self(normalize_whitespace(s, false))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn decode(raw: &str) -> Self {
        Self(decode_text(raw, false))
    }
}

impl fmt::Display for SimpleText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Value for SimpleText {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        Ok(Self::decode(single(raw, "text")?))
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| encode_text(&self.0, false, o));
    }
}

/// Multi-line text. Line breaks are kept as `\n`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Text(String);

impl Text {
    pub fn new(s: &str) -> Self {
        Self(normalize_whitespace(s, true))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Value for Text {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        Ok(Self(decode_text(single(raw, "text")?, true)))
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| encode_text(&self.0, false, o));
    }
}

/// A value of an unrecognized property, unescaped but otherwise untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnknownValue(pub String);

/// All values of an unrecognized property.
///
/// Never empty: `XX[]` reads as one empty value, so an empty list is stored
/// as that too.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnknownValues(Vec<UnknownValue>);

impl UnknownValues {
    pub fn new(values: impl IntoIterator<Item = UnknownValue>) -> Self {
        let mut values: Vec<UnknownValue> = values.into_iter().collect();
        if values.is_empty() {
            values.push(UnknownValue(String::new()));
        }
        Self(values)
    }

    pub fn as_slice(&self) -> &[UnknownValue] {
        &self.0
    }
}

impl Value for UnknownValues {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        Ok(UnknownValues::new(raw.iter().map(|r| {
            let mut s = String::with_capacity(r.len());
            let mut chars = r.chars();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => s.extend(chars.next()),
                    c => s.push(c),
                }
            }
            UnknownValue(s)
        })))
    }

    fn render_values(&self, out: &mut String) {
        for v in &self.0 {
            bracket(out, |o| encode_text(&v.0, false, o));
        }
    }
}

// =============================================================================
// Coordinates
// =============================================================================

/// A board point: zero-based column and row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    fn axis_from_letter(c: u8) -> Option<usize> {
        match c {
            b'a'..=b'z' => Some((c - b'a') as usize),
            b'A'..=b'Z' => Some((c - b'A') as usize + 26),
            _ => None,
        }
    }

    fn axis_to_letter(n: usize) -> char {
        match n {
            0..=25 => (b'a' + n as u8) as char,
            26..=51 => (b'A' + (n - 26) as u8) as char,
            _ => '?',
        }
    }

    /// Parse a two-letter SGF point such as `cd`.
    pub fn from_sgf(s: &str) -> Option<Coord> {
        match s.as_bytes() {
            [x, y] => Some(Coord::new(
                Self::axis_from_letter(*x)?,
                Self::axis_from_letter(*y)?,
            )),
            _ => None,
        }
    }

    pub fn write_sgf(&self, out: &mut String) {
        out.push(Self::axis_to_letter(self.x));
        out.push(Self::axis_to_letter(self.y));
    }

    pub fn to_sgf(&self) -> String {
        let mut s = String::with_capacity(2);
        self.write_sgf(&mut s);
        s
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sgf())
    }
}

fn parse_point(raw: &str) -> ValueResult<Coord> {
    let s = raw.trim();
    Coord::from_sgf(s).ok_or_else(|| format!("a point of two letters (got {s:?})"))
}

/// A move: a point, or a pass written as an empty value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Pass,
    Play(Coord),
}

impl Move {
    pub fn coord(&self) -> Option<Coord> {
        match self {
            Move::Pass => None,
            Move::Play(c) => Some(*c),
        }
    }
}

impl Value for Move {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        match single(raw, "move")?.trim() {
            "" => Ok(Move::Pass),
            s => parse_point(s).map(Move::Play),
        }
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| {
            if let Move::Play(c) = self {
                c.write_sgf(o);
            }
        });
    }
}

/// A list of points as written in the file: single points and rectangles.
///
/// Rectangles are kept rather than expanded so they render back the same way.
/// Duplicates are allowed. An empty list renders as `[]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CoordList {
    pub singles: Vec<Coord>,
    /// Rectangles as (top-left, bottom-right), both inclusive.
    pub rects: Vec<(Coord, Coord)>,
}

impl CoordList {
    pub fn from_coords(coords: impl IntoIterator<Item = Coord>) -> Self {
        Self {
            singles: coords.into_iter().collect(),
            rects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.rects.is_empty()
    }

    /// Every point, singles first, then each rectangle row by row.
    pub fn to_coords(&self) -> Vec<Coord> {
        let mut out = self.singles.clone();
        for (a, b) in &self.rects {
            for y in a.y..=b.y {
                for x in a.x..=b.x {
                    out.push(Coord::new(x, y));
                }
            }
        }
        out
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.singles.contains(&c)
            || self
                .rects
                .iter()
                .any(|(a, b)| (a.x..=b.x).contains(&c.x) && (a.y..=b.y).contains(&c.y))
    }
}

/// A lone `[]` is how an empty list is written.
fn is_empty_list(raw: &[String]) -> bool {
    matches!(raw, [one] if one.trim().is_empty())
}

impl Value for CoordList {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        let mut list = CoordList::default();
        if is_empty_list(raw) {
            return Ok(list);
        }
        for r in raw {
            match split_composed(r) {
                Some((a, b)) => {
                    let (a, b) = (parse_point(a)?, parse_point(b)?);
                    list.rects.push((
                        Coord::new(a.x.min(b.x), a.y.min(b.y)),
                        Coord::new(a.x.max(b.x), a.y.max(b.y)),
                    ));
                }
                None => list.singles.push(parse_point(r)?),
            }
        }
        Ok(list)
    }

    fn render_values(&self, out: &mut String) {
        if self.is_empty() {
            out.push_str("[]");
            return;
        }
        for c in &self.singles {
            bracket(out, |o| c.write_sgf(o));
        }
        for (a, b) in &self.rects {
            bracket(out, |o| {
                a.write_sgf(o);
                o.push(':');
                b.write_sgf(o);
            });
        }
    }
}

/// Arrows and lines: `AR[aa:bb]`. An empty list renders as `[]`.
impl Value for Vec<(Coord, Coord)> {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        if is_empty_list(raw) {
            return Ok(Vec::new());
        }
        raw.iter()
            .map(|r| match split_composed(r) {
                Some((a, b)) => Ok((parse_point(a)?, parse_point(b)?)),
                None => Err(format!("a point pair point:point (got {r:?})")),
            })
            .collect()
    }

    fn render_values(&self, out: &mut String) {
        if self.is_empty() {
            out.push_str("[]");
        }
        for (a, b) in self {
            bracket(out, |o| {
                a.write_sgf(o);
                o.push(':');
                b.write_sgf(o);
            });
        }
    }
}

/// Labels: `LB[aa:text]`. An empty list renders as `[]`.
impl Value for Vec<(Coord, SimpleText)> {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        if is_empty_list(raw) {
            return Ok(Vec::new());
        }
        raw.iter()
            .map(|r| match split_composed(r) {
                Some((a, text)) => Ok((parse_point(a)?, SimpleText::decode(text))),
                None => Err(format!("a label point:text (got {r:?})")),
            })
            .collect()
    }

    fn render_values(&self, out: &mut String) {
        if self.is_empty() {
            out.push_str("[]");
        }
        for (c, text) in self {
            bracket(out, |o| {
                c.write_sgf(o);
                o.push(':');
                encode_text(text.as_str(), true, o);
            });
        }
    }
}

/// Application name and version: `AP[name:version]`.
impl Value for (SimpleText, SimpleText) {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        let r = single(raw, "application")?;
        match split_composed(r) {
            Some((name, version)) => Ok((SimpleText::decode(name), SimpleText::decode(version))),
            None => Err(format!("an application name:version (got {r:?})")),
        }
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| {
            encode_text(self.0.as_str(), true, o);
            o.push(':');
            encode_text(self.1.as_str(), true, o);
        });
    }
}

/// Figure: `FG[]` or `FG[flags:name]`.
impl Value for Option<(i64, SimpleText)> {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        let r = single(raw, "figure")?;
        if r.trim().is_empty() {
            return Ok(None);
        }
        match split_composed(r) {
            Some((flags, name)) => Ok(Some((parse_number(flags)?, SimpleText::decode(name)))),
            None => Err(format!("a figure flags:name or empty (got {r:?})")),
        }
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| {
            if let Some((flags, name)) = self {
                o.push_str(&flags.to_string());
                o.push(':');
                encode_text(name.as_str(), true, o);
            }
        });
    }
}

// =============================================================================
// Root and game-info values
// =============================================================================

/// Board dimensions from `SZ`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardSize {
    pub width: usize,
    pub height: usize,
}

impl BoardSize {
    pub fn square(size: usize) -> Self {
        Self {
            width: size,
            height: size,
        }
    }
}

impl Value for BoardSize {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        const EXPECTED: &str = "board size (width or width:height)";
        let r = single(raw, EXPECTED)?;
        let dim = |s: &str| -> ValueResult<usize> {
            let n = parse_number(s).map_err(|_| format!("{EXPECTED}, got {r:?}"))?;
            usize::try_from(n)
                .ok()
                .filter(|n| (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(n))
                .ok_or_else(|| {
                    format!(
                        "{EXPECTED} with each side between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}, got {r:?}"
                    )
                })
        };
        match split_composed(r) {
            Some((w, h)) => {
                let size = BoardSize {
                    width: dim(w)?,
                    height: dim(h)?,
                };
                if size.width == size.height {
                    return Err(format!(
                        "{EXPECTED}; a square board is written as a single number, got {r:?}"
                    ));
                }
                Ok(size)
            }
            None => dim(r).map(BoardSize::square),
        }
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| {
            if self.width == self.height {
                o.push_str(&self.width.to_string());
            } else {
                o.push_str(&format!("{}:{}", self.width, self.height));
            }
        });
    }
}

/// How variations are shown, from `ST`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VariationMode {
    /// Show alternatives to the current move (siblings) instead of its children.
    pub siblings: bool,
    /// Mark variations on the board.
    pub hide_markup: bool,
}

impl Value for VariationMode {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        let n = parse_number(single(raw, "variation mode")?)?;
        if !(0..=3).contains(&n) {
            return Err(format!("a variation mode between 0 and 3 (got {n})"));
        }
        Ok(Self {
            siblings: n & 1 != 0,
            hide_markup: n & 2 != 0,
        })
    }

    fn render_values(&self, out: &mut String) {
        let n = self.siblings as u8 | (self.hide_markup as u8) << 1;
        bracket(out, |o| o.push_str(&n.to_string()));
    }
}

/// Free text that matches none of a value's recognized forms.
///
/// It is only made by parsing, after every recognized form has been tried,
/// so it never holds text that would read back as something else.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OtherText(SimpleText);

impl OtherText {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// How a game was won.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WinReason {
    Score(BigFloat),
    Resignation,
    Time,
    Forfeit,
}

/// Game result from `RE`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    Draw,
    Void,
    Unknown,
    Win(Color, WinReason),
    Other(OtherText),
}

impl GameResult {
    fn from_text(text: SimpleText) -> Self {
        match text.as_str() {
            "0" | "Draw" => return GameResult::Draw,
            "Void" => return GameResult::Void,
            "?" => return GameResult::Unknown,
            _ => {}
        }
        let win = text.as_str().split_once('+').and_then(|(color, reason)| {
            let color = Color::from_letter(color)?;
            let reason = match reason {
                "R" | "Resign" => WinReason::Resignation,
                "T" | "Time" => WinReason::Time,
                "F" | "Forfeit" => WinReason::Forfeit,
                score => WinReason::Score(score.parse().ok()?),
            };
            Some(GameResult::Win(color, reason))
        });
        win.unwrap_or(GameResult::Other(OtherText(text)))
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Draw => f.write_str("0"),
            GameResult::Void => f.write_str("Void"),
            GameResult::Unknown => f.write_str("?"),
            GameResult::Win(color, reason) => {
                write!(f, "{}+", color.letter())?;
                match reason {
                    WinReason::Score(score) => write!(f, "{score}"),
                    WinReason::Resignation => f.write_str("R"),
                    WinReason::Time => f.write_str("T"),
                    WinReason::Forfeit => f.write_str("F"),
                }
            }
            GameResult::Other(text) => f.write_str(text.as_str()),
        }
    }
}

impl FromStr for GameResult {
    type Err = Infallible;

    /// Any text is a result; unrecognized text is kept as [`GameResult::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(GameResult::from_text(SimpleText::new(s)))
    }
}

impl Value for GameResult {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        SimpleText::parse_values(raw).map(GameResult::from_text)
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| encode_text(&self.to_string(), false, o));
    }
}

/// Rule set from `RU`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ruleset {
    Aga,
    Ing,
    Japanese,
    NewZealand,
    Chinese,
    Other(OtherText),
}

impl Ruleset {
    fn from_text(text: SimpleText) -> Self {
        match text.as_str() {
            "AGA" => Ruleset::Aga,
            "GOE" => Ruleset::Ing,
            "Japanese" => Ruleset::Japanese,
            "NZ" => Ruleset::NewZealand,
            "Chinese" => Ruleset::Chinese,
            _ => Ruleset::Other(OtherText(text)),
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ruleset::Aga => f.write_str("AGA"),
            Ruleset::Ing => f.write_str("GOE"),
            Ruleset::Japanese => f.write_str("Japanese"),
            Ruleset::NewZealand => f.write_str("NZ"),
            Ruleset::Chinese => f.write_str("Chinese"),
            Ruleset::Other(text) => f.write_str(text.as_str()),
        }
    }
}

impl FromStr for Ruleset {
    type Err = Infallible;

    /// Any text is a rule set; unrecognized text is kept as [`Ruleset::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Ruleset::from_text(SimpleText::new(s)))
    }
}

impl Value for Ruleset {
    fn parse_values(raw: &[String]) -> ValueResult<Self> {
        SimpleText::parse_values(raw).map(Ruleset::from_text)
    }

    fn render_values(&self, out: &mut String) {
        bracket(out, |o| encode_text(&self.to_string(), false, o));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn render<T: Value>(v: &T) -> String {
        let mut out = String::new();
        v.render_values(&mut out);
        out
    }

    /// Render a single-valued `v` and read it back.
    fn reparse<T: Value>(v: &T) -> ValueResult<T> {
        let text = render(v);
        T::parse_values(&raw(&[&text[1..text.len() - 1]]))
    }

    #[test]
    fn test_coord_letters() {
        assert_eq!(Coord::from_sgf("ab"), Some(Coord::new(0, 1)));
        assert_eq!(Coord::from_sgf("zA"), Some(Coord::new(25, 26)));
        assert_eq!(Coord::from_sgf("ZZ"), Some(Coord::new(51, 51)));
        assert_eq!(Coord::from_sgf("a"), None);
        assert_eq!(Coord::from_sgf("a1"), None);
        assert_eq!(Coord::new(2, 3).to_sgf(), "cd");
    }

    #[test]
    fn test_simple_text_folds_newlines() {
        let t = SimpleText::parse_values(&raw(&["one\r\ntwo\tthree"])).unwrap();
        assert_eq!(t.as_str(), "one two three");
    }

    #[test]
    fn test_text_keeps_newlines_and_elides_soft_breaks() {
        let t = Text::parse_values(&raw(&["line\\\none\nline two \\] \\\\"])).unwrap();
        assert_eq!(t.as_str(), "lineone\nline two ] \\");
    }

    #[test]
    fn test_text_escaping_on_render() {
        assert_eq!(render(&Text::new("a]b\\c:d")), "[a\\]b\\\\c:d]");
        let labels = vec![(Coord::new(0, 0), SimpleText::new("x:y"))];
        assert_eq!(render(&labels), "[aa:x\\:y]");
    }

    #[test]
    fn test_split_composed_honors_escapes() {
        assert_eq!(split_composed("a\\:b:c"), Some(("a\\:b", "c")));
        assert_eq!(split_composed("abc"), None);
    }

    #[test]
    fn test_move_and_pass() {
        assert_eq!(Move::parse_values(&raw(&[""])), Ok(Move::Pass));
        assert_eq!(
            Move::parse_values(&raw(&["cd"])),
            Ok(Move::Play(Coord::new(2, 3)))
        );
        assert!(Move::parse_values(&raw(&["c"])).is_err());
        assert_eq!(render(&Move::Pass), "[]");
    }

    #[test]
    fn test_coord_list_rectangles() {
        let list = CoordList::parse_values(&raw(&["aa", "cc:bb", "aa"])).unwrap();
        assert_eq!(list.singles, vec![Coord::new(0, 0), Coord::new(0, 0)]);
        assert_eq!(list.rects, vec![(Coord::new(1, 1), Coord::new(2, 2))]);
        assert_eq!(list.to_coords().len(), 6);
        assert!(list.contains(Coord::new(2, 1)));
        assert!(!list.contains(Coord::new(3, 1)));
        assert_eq!(render(&list), "[aa][aa][bb:cc]");
        assert_eq!(render(&CoordList::default()), "[]");
    }

    #[test]
    fn test_board_size() {
        assert_eq!(
            BoardSize::parse_values(&raw(&["19"])),
            Ok(BoardSize::square(19))
        );
        assert_eq!(
            BoardSize::parse_values(&raw(&["9:13"])),
            Ok(BoardSize {
                width: 9,
                height: 13
            })
        );
        let square = BoardSize::parse_values(&raw(&["9:9"])).unwrap_err();
        assert!(square.contains("single number"));
        let big = BoardSize::parse_values(&raw(&["53"])).unwrap_err();
        assert!(big.contains("board size (width or width:height)"));
        assert!(BoardSize::parse_values(&raw(&["0"])).is_err());
        assert!(BoardSize::parse_values(&raw(&["x"])).is_err());
        assert_eq!(render(&BoardSize { width: 5, height: 7 }), "[5:7]");
    }

    #[test]
    fn test_numbers_and_doubles() {
        assert_eq!(i64::parse_values(&raw(&["+12"])), Ok(12));
        assert_eq!(i64::parse_values(&raw(&["-3"])), Ok(-3));
        assert!(i64::parse_values(&raw(&["1.5"])).is_err());
        assert!(i64::parse_values(&raw(&["1", "2"])).is_err());
        assert_eq!(Double::parse_values(&raw(&["2"])), Ok(Double::Emphasized));
        assert!(Double::parse_values(&raw(&["3"])).is_err());
        assert_eq!(Color::parse_values(&raw(&["W"])), Ok(Color::White));
    }

    #[test]
    fn test_game_result() {
        let parse = |s: &str| GameResult::parse_values(&raw(&[s])).unwrap();
        assert_eq!(
            parse("B+R"),
            GameResult::Win(Color::Black, WinReason::Resignation)
        );
        assert_eq!(
            parse("W+6.5"),
            GameResult::Win(Color::White, WinReason::Score("6.5".parse().unwrap()))
        );
        assert_eq!(parse("Draw"), GameResult::Draw);
        assert_eq!(parse("?"), GameResult::Unknown);
        let GameResult::Other(other) = parse("Jigo!") else {
            panic!("expected free text");
        };
        assert_eq!(other.as_str(), "Jigo!");
        assert_eq!(render(&parse("W+Resign")), "[W+R]");
    }

    #[test]
    fn test_free_text_results_read_back_unchanged() {
        for s in ["B+R", "W+0.5", "Void", "0", "Jigo!", "B+", "Q+R"] {
            let result: GameResult = s.parse().unwrap();
            assert_eq!(reparse(&result), Ok(result), "{s}");
        }
        assert_eq!(
            "B+R".parse(),
            Ok(GameResult::Win(Color::Black, WinReason::Resignation))
        );
        for s in ["AGA", "Japanese", "Korean"] {
            let ru: Ruleset = s.parse().unwrap();
            assert_eq!(reparse(&ru), Ok(ru), "{s}");
        }
        assert!(matches!("Korean".parse::<Ruleset>(), Ok(Ruleset::Other(t)) if t.as_str() == "Korean"));
    }

    #[test]
    fn test_ruleset_and_variation_mode() {
        let ru = Ruleset::parse_values(&raw(&["GOE"])).unwrap();
        assert_eq!(ru, Ruleset::Ing);
        assert_eq!(render(&ru), "[GOE]");

        let st = VariationMode::parse_values(&raw(&["3"])).unwrap();
        assert!(st.siblings && st.hide_markup);
        assert_eq!(render(&st), "[3]");
        assert!(VariationMode::parse_values(&raw(&["4"])).is_err());
    }

    #[test]
    fn test_unknown_values_unescape() {
        let v = UnknownValues::parse_values(&raw(&["a\\]b", ""])).unwrap();
        assert_eq!(
            v.as_slice(),
            &[UnknownValue("a]b".into()), UnknownValue(String::new())]
        );
        assert_eq!(render(&v), "[a\\]b][]");
    }

    #[test]
    fn test_empty_lists_render_as_empty_brackets() {
        let arrows: Vec<(Coord, Coord)> = Vec::new();
        assert_eq!(render(&arrows), "[]");
        assert_eq!(Vec::<(Coord, Coord)>::parse_values(&raw(&[""])), Ok(Vec::new()));

        let labels: Vec<(Coord, SimpleText)> = Vec::new();
        assert_eq!(render(&labels), "[]");
        assert_eq!(Vec::<(Coord, SimpleText)>::parse_values(&raw(&[" "])), Ok(Vec::new()));

        let unknown = UnknownValues::new(Vec::<UnknownValue>::new());
        assert_eq!(render(&unknown), "[]");
        assert_eq!(UnknownValues::parse_values(&raw(&[""])), Ok(unknown));
    }
}
