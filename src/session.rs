//! Line-oriented edit session.
//!
//! A [`Session`] drives a [`GoEngine`] from text commands, one per line, the
//! way a GUI would drive it from clicks. The protocol borrows GTP's framing:
//! a command may start with a numeric id, and every response is `=id text`
//! on success or `?id text` on failure, followed by a blank line. Failed
//! commands never end the session.
//!
//! ## Commands
//!
//! - `up`, `down <i>`, `root` - navigate
//! - `push`, `pop`, `drop` - bookmarks
//! - `play <B|W> <point|pass>` - play a move, reusing an existing variation
//! - `child [i]` - add an empty child (at the end by default)
//! - `comment [text]` - set the comment; no text removes it
//! - `info [NAME value]` - show the game info, or set one game-info property
//! - `show` - board diagram and position
//! - `sgf` - the whole tree as SGF
//! - `status` - event counts and whether the tree was edited
//! - `list_commands`, `known_command <cmd>`, `quit`

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use tracing::{debug, info};

use crate::common::replace_or_push;
use crate::engine::{EngineError, GoEngine, Handler};
use crate::game_info::GameInfo;
use crate::node::Node;
use crate::property::Property;
use crate::renderer::render_tree;
use crate::values::{Color, Coord, Move};

const KNOWN_COMMANDS: &[&str] = &[
    "child",
    "comment",
    "down",
    "drop",
    "info",
    "known_command",
    "list_commands",
    "play",
    "pop",
    "push",
    "quit",
    "root",
    "sgf",
    "show",
    "status",
    "up",
];

/// Events seen since the session started.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    pub navigations: usize,
    pub properties_changed: usize,
    pub children_added: usize,
    pub game_info_changed: usize,
}

impl EventLog {
    /// Whether the tree has been edited.
    pub fn is_dirty(&self) -> bool {
        self.properties_changed > 0 || self.children_added > 0
    }
}

pub struct Session {
    engine: GoEngine,
    events: Rc<RefCell<EventLog>>,
}

impl Session {
    pub fn new(root: Node) -> Self {
        let mut engine = GoEngine::new(root);
        let events = Rc::new(RefCell::new(EventLog::default()));

        let log = Rc::clone(&events);
        engine.on(Handler::navigation(move |_, step| {
            debug!(%step, "navigated");
            log.borrow_mut().navigations += 1;
            Ok(())
        }));
        let log = Rc::clone(&events);
        engine.on(Handler::properties_changed(move |_, _, new| {
            debug!(properties = new.len(), "properties changed");
            log.borrow_mut().properties_changed += 1;
            Ok(())
        }));
        let log = Rc::clone(&events);
        engine.on(Handler::child_added(move |_, index| {
            debug!(index, "child added");
            log.borrow_mut().children_added += 1;
            Ok(())
        }));
        let log = Rc::clone(&events);
        engine.on(Handler::game_info_changed(move |_, _, _| {
            log.borrow_mut().game_info_changed += 1;
            Ok(())
        }));

        Self { engine, events }
    }

    pub fn engine(&self) -> &GoEngine {
        &self.engine
    }

    pub fn events(&self) -> EventLog {
        self.events.borrow().clone()
    }

    pub fn into_root(self) -> Node {
        self.engine.into_root()
    }

    /// Read commands from `input` until `quit` or end of input, answering on
    /// `output`.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        info!(events = ?self.events(), "session ended");
        Ok(())
    }

    /// Split an optional numeric command id off the front of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Run one command, returning (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        let result = match command {
            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),
            "known_command" => match args.first() {
                Some(cmd) => Ok(KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str()).to_string()),
                None => Err("missing argument".to_string()),
            },
            "quit" => Ok(String::new()),

            "up" => self.engine.go_up().map(|()| String::new()).map_err(describe),
            "down" => match parse_index(args) {
                Ok(Some(i)) => self.engine.go_down(i).map(|()| String::new()).map_err(describe),
                Ok(None) => Err("missing child index".to_string()),
                Err(e) => Err(e),
            },
            "root" => self.engine.go_to_root().map(|()| String::new()).map_err(describe),
            "push" => {
                self.engine.push_position();
                Ok(String::new())
            }
            "pop" => self.engine.pop_position().map(|()| String::new()).map_err(describe),
            "drop" => self.engine.drop_position().map(|()| String::new()).map_err(describe),

            "play" => self.play(args),
            "child" => match parse_index(args) {
                Ok(index) => {
                    let index = index.unwrap_or(self.engine.cursor().child_count());
                    self.engine
                        .add_child(index, Node::new())
                        .map(|()| index.to_string())
                        .map_err(describe)
                }
                Err(e) => Err(e),
            },
            "comment" => {
                let text = args.join(" ");
                self.engine
                    .modify_comment(|_| text)
                    .map(|()| String::new())
                    .map_err(describe)
            }
            "info" => self.info(args),
            "show" => Ok(self.show()),
            "sgf" => Ok(render_tree(&self.engine.root_node()).trim_end().to_string()),
            "status" => {
                let events = self.events();
                Ok(format!(
                    "navigations {} properties {} children {} game-info {} bookmarks {} {}",
                    events.navigations,
                    events.properties_changed,
                    events.children_added,
                    events.game_info_changed,
                    self.engine.path_stack().len(),
                    if events.is_dirty() { "modified" } else { "unmodified" },
                ))
            }

            _ => Err(format!("unknown command: {command}")),
        };
        match result {
            Ok(message) => (true, message),
            Err(message) => (false, message),
        }
    }

    fn play(&mut self, args: &[&str]) -> Result<String, String> {
        let [color, point] = args else {
            return Err("usage: play <B|W> <point|pass>".to_string());
        };
        let color = Color::from_letter(&color.to_uppercase())
            .ok_or_else(|| format!("invalid color: {color}"))?;
        let mv = if point.eq_ignore_ascii_case("pass") {
            Move::Pass
        } else {
            Move::Play(Coord::from_sgf(point).ok_or_else(|| format!("invalid point: {point}"))?)
        };
        self.engine.play_move(color, mv).map_err(describe)?;
        Ok(self.engine.cursor().path().len().to_string())
    }

    fn info(&mut self, args: &[&str]) -> Result<String, String> {
        let Some((name, value)) = args.split_first() else {
            let info = self.engine.cursor().game_info();
            return Ok(describe_info(&info));
        };
        let name = name.to_uppercase();
        let property =
            Property::from_raw(&name, &[value.join(" ")]).map_err(|e| format!("{name}: expected {e}"))?;
        if !property.is_game_info() {
            return Err(format!("{name} is not a game-info property"));
        }
        let info = self
            .engine
            .modify_game_info(|info| {
                let mut properties = info.to_properties();
                replace_or_push(&mut properties, property, |p| p.name() == name);
                GameInfo::from_properties(info.root_info, &properties)
            })
            .map_err(describe)?;
        Ok(describe_info(&info))
    }

    fn show(&self) -> String {
        let cursor = self.engine.cursor();
        let mut out = cursor.board().to_string();
        let path: Vec<String> = cursor.path().iter().map(usize::to_string).collect();
        out.push_str(&format!(
            "path [{}] children {}",
            path.join(" "),
            cursor.child_count()
        ));
        if let Some(Property::C(text)) = cursor.node().property("C") {
            out.push_str(&format!("\ncomment: {}", text.as_str()));
        }
        out
    }
}

fn describe(e: EngineError) -> String {
    e.to_string()
}

fn parse_index(args: &[&str]) -> Result<Option<usize>, String> {
    match args.first() {
        None => Ok(None),
        Some(s) => s
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("invalid index: {s}")),
    }
}

fn describe_info(info: &GameInfo) -> String {
    let mut lines = vec![format!("size {}x{}", info.root_info.width, info.root_info.height)];
    for p in info.to_properties() {
        let mut value = String::new();
        p.render_values(&mut value);
        lines.push(format!("{} {}", p.name(), value));
    }
    lines.join("\n")
}
