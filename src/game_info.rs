//! Game information: players, rules, result and the like.
//!
//! Game-info properties live on one node per game (usually the root, but a
//! file may hold several games below a shared root). The info in effect at a
//! cursor comes from the nearest ancestor-or-self node carrying any of them,
//! combined with the root's board size.

use crate::bigfloat::BigFloat;
use crate::property::Property;
use crate::values::{BoardSize, GameResult, Ruleset, SimpleText, Text};

/// Properties of the tree as a whole that game info must not change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RootInfo {
    pub width: usize,
    pub height: usize,
}

impl From<BoardSize> for RootInfo {
    fn from(size: BoardSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

macro_rules! game_info {
    ($( $(#[$attr:meta])* $field:ident: $prop:ident($ty:ty), )*) => {
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct GameInfo {
            pub root_info: RootInfo,
            $( $(#[$attr])* pub $field: Option<$ty>, )*
        }

        impl GameInfo {
            pub fn new(root_info: RootInfo) -> Self {
                Self {
                    root_info,
                    $( $field: None, )*
                }
            }

            /// Read every game-info property from `properties`.
            pub fn from_properties(root_info: RootInfo, properties: &[Property]) -> Self {
                let mut info = Self::new(root_info);
                for p in properties {
                    match p {
                        $( Property::$prop(v) => info.$field = Some(v.clone()), )*
                        _ => {}
                    }
                }
                info
            }

            /// The game-info properties describing this info, in a fixed order.
            pub fn to_properties(&self) -> Vec<Property> {
                let mut out = Vec::new();
                $(
                    if let Some(v) = &self.$field {
                        out.push(Property::$prop(v.clone()));
                    }
                )*
                out
            }
        }
    };
}

game_info! {
    game_name: GN(SimpleText),
    event: EV(SimpleText),
    round: RO(SimpleText),
    dates: DT(SimpleText),
    place: PC(SimpleText),
    black_name: PB(SimpleText),
    black_rank: BR(SimpleText),
    black_team: BT(SimpleText),
    white_name: PW(SimpleText),
    white_rank: WR(SimpleText),
    white_team: WT(SimpleText),
    ruleset: RU(Ruleset),
    handicap: HA(i64),
    komi: KM(BigFloat),
    /// Basic time per player, in seconds.
    basic_time_seconds: TM(BigFloat),
    overtime: OT(SimpleText),
    result: RE(GameResult),
    opening: ON(SimpleText),
    game_comment: GC(Text),
    annotator: AN(SimpleText),
    copyright: CP(SimpleText),
    source: SO(SimpleText),
    entered_by: US(SimpleText),
}
