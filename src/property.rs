//! SGF properties.
//!
//! [`Property`] has one variant per FF[4] property, each carrying its typed
//! value, plus [`Property::Unknown`] for anything else so that unrecognized
//! properties survive a parse-render cycle. The variant table below drives
//! naming, categorization, parsing, and rendering.

use crate::bigfloat::BigFloat;
use crate::values::{
    BoardSize, Color, Coord, CoordList, Double, GameResult, Move, Ruleset, SimpleText, Text,
    UnknownValues, Value, ValueResult, VariationMode,
};

/// What part of the game record a property belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Plays a stone (`B`, `W`) or annotates how it is played.
    Move,
    /// Sets up the position (`AB`, `AW`, `AE`, `PL`).
    Setup,
    /// Describes the whole file; only valid on a root node.
    Root,
    /// Describes a game: players, result, rules.
    GameInfo,
    /// Annotations, markup, timing and everything else that may appear anywhere.
    General,
    Unknown,
}

macro_rules! properties {
    ($( $(#[$attr:meta])* $name:ident($ty:ty) => $category:ident, )*) => {
        /// A single SGF property with its typed value.
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum Property {
            $( $(#[$attr])* $name($ty), )*
            /// A property this crate does not know, with its raw values.
            Unknown(String, UnknownValues),
        }

        impl Property {
            /// The property identifier as written in SGF, e.g. `"SZ"`.
            pub fn name(&self) -> &str {
                match self {
                    $( Property::$name(_) => stringify!($name), )*
                    Property::Unknown(name, _) => name,
                }
            }

            /// The category of the property named `name`.
            pub fn category_of(name: &str) -> Category {
                match name {
                    $( stringify!($name) => Category::$category, )*
                    _ => Category::Unknown,
                }
            }

            /// Build a property from its name and raw bracketed values.
            ///
            /// Unknown names never fail; their values are kept as text.
            pub fn from_raw(name: &str, raw: &[String]) -> ValueResult<Property> {
                match name {
                    $( stringify!($name) => <$ty as Value>::parse_values(raw).map(Property::$name), )*
                    _ => Ok(Property::Unknown(
                        name.to_string(),
                        UnknownValues::parse_values(raw)?,
                    )),
                }
            }

            /// Append the bracketed values, without the name.
            pub fn render_values(&self, out: &mut String) {
                match self {
                    $( Property::$name(value) => value.render_values(out), )*
                    Property::Unknown(_, values) => values.render_values(out),
                }
            }
        }
    };
}

properties! {
    // Move
    /// Black plays.
    B(Move) => Move,
    /// White plays.
    W(Move) => Move,
    KO(()) => Move,
    MN(i64) => Move,

    // Setup
    AB(CoordList) => Setup,
    AW(CoordList) => Setup,
    AE(CoordList) => Setup,
    /// Player to move next.
    PL(Color) => Setup,

    // Node annotation
    /// Comment.
    C(Text) => General,
    DM(Double) => General,
    GB(Double) => General,
    GW(Double) => General,
    HO(Double) => General,
    /// Node name.
    N(SimpleText) => General,
    UC(Double) => General,
    V(BigFloat) => General,

    // Move annotation
    BM(Double) => Move,
    DO(()) => Move,
    IT(()) => Move,
    TE(Double) => Move,

    // Markup
    AR(Vec<(Coord, Coord)>) => General,
    CR(CoordList) => General,
    DD(CoordList) => General,
    LB(Vec<(Coord, SimpleText)>) => General,
    LN(Vec<(Coord, Coord)>) => General,
    MA(CoordList) => General,
    SL(CoordList) => General,
    SQ(CoordList) => General,
    TR(CoordList) => General,

    // Root
    AP((SimpleText, SimpleText)) => Root,
    CA(SimpleText) => Root,
    FF(i64) => Root,
    GM(i64) => Root,
    ST(VariationMode) => Root,
    /// Board size. Required on every root node.
    SZ(BoardSize) => Root,

    // Game info
    AN(SimpleText) => GameInfo,
    BR(SimpleText) => GameInfo,
    BT(SimpleText) => GameInfo,
    CP(SimpleText) => GameInfo,
    DT(SimpleText) => GameInfo,
    EV(SimpleText) => GameInfo,
    GC(Text) => GameInfo,
    GN(SimpleText) => GameInfo,
    ON(SimpleText) => GameInfo,
    OT(SimpleText) => GameInfo,
    PB(SimpleText) => GameInfo,
    PC(SimpleText) => GameInfo,
    PW(SimpleText) => GameInfo,
    RE(GameResult) => GameInfo,
    RO(SimpleText) => GameInfo,
    RU(Ruleset) => GameInfo,
    SO(SimpleText) => GameInfo,
    TM(BigFloat) => GameInfo,
    US(SimpleText) => GameInfo,
    WR(SimpleText) => GameInfo,
    WT(SimpleText) => GameInfo,
    HA(i64) => GameInfo,
    KM(BigFloat) => GameInfo,

    // Timing
    BL(BigFloat) => Move,
    OB(i64) => Move,
    OW(i64) => Move,
    WL(BigFloat) => Move,

    // Miscellaneous
    FG(Option<(i64, SimpleText)>) => General,
    PM(i64) => General,
    VW(CoordList) => General,

    // Go territory
    TB(CoordList) => General,
    TW(CoordList) => General,
}

/// Names of the markup properties.
const MARKUP: &[&str] = &["AR", "CR", "DD", "LB", "LN", "MA", "SL", "SQ", "TR"];

impl Property {
    pub fn category(&self) -> Category {
        match self {
            Property::Unknown(..) => Category::Unknown,
            p => Property::category_of(p.name()),
        }
    }

    pub fn is_game_info(&self) -> bool {
        self.category() == Category::GameInfo
    }

    pub fn is_markup(&self) -> bool {
        MARKUP.contains(&self.name())
    }

    /// Render the whole property, e.g. `B[cd]`.
    pub fn render(&self, out: &mut String) {
        out.push_str(self.name());
        self.render_values(out);
    }

    /// The move this property plays, with its color.
    pub fn as_move(&self) -> Option<(Color, Move)> {
        match self {
            Property::B(mv) => Some((Color::Black, *mv)),
            Property::W(mv) => Some((Color::White, *mv)),
            _ => None,
        }
    }

    /// A move property for `color`.
    pub fn play(color: Color, mv: Move) -> Property {
        match color {
            Color::Black => Property::B(mv),
            Color::White => Property::W(mv),
        }
    }
}

/// Whether `name` is a syntactically valid property identifier.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_uppercase())
}
