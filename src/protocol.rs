//! Line-oriented record protocol, modelled on GTP.
//!
//! Each request is one line, optionally prefixed by a numeric id. Responses
//! start with `=` (success) or `?` (failure), echo the id and end with a blank
//! line, exactly as in GTP version 2.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`,
//!   `known_command <cmd>`, `quit`
//! - `boardsize <size>` - Accept only the session's board size
//! - `clear_board` - Start a new game
//! - `play [color] <vertex>` - Play the side to move (color is checked if given)
//! - `undo` / `redo` - Step back, or forward along the main line
//! - `switch <node-id>` - Jump to any node, e.g. into a side branch
//! - `showboard` - Print the board at the current node
//! - `tree` - List all nodes, `*` marks the current one
//! - `serialize` - Print the whole record as JSON
//! - `save <title>` / `load <draft-id>` / `drafts` / `delete <draft-id>`
//!
//! ## Example
//!
//! ```ignore
//! use kifu_rust::protocol::RecordEngine;
//! use kifu_rust::store::InMemoryDraftStore;
//! let mut engine = RecordEngine::new(InMemoryDraftStore::new());
//! engine.run(std::io::stdin().lock(), std::io::stdout())?;
//! ```

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::board::{Color, Point};
use crate::constants::COLUMN_LETTERS;
use crate::session::GameSession;
use crate::store::DraftStore;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "delete",
    "drafts",
    "known_command",
    "list_commands",
    "load",
    "name",
    "play",
    "protocol_version",
    "quit",
    "redo",
    "save",
    "serialize",
    "showboard",
    "switch",
    "tree",
    "undo",
    "version",
];

/// Parse a vertex such as `D4` into a point. Rows count up from the bottom
/// edge, so `A1` is `(0, size - 1)`.
pub fn parse_vertex(s: &str, size: usize) -> Option<Point> {
    let bytes = s.as_bytes();
    let (&col_char, row) = bytes.split_first()?;
    let col = COLUMN_LETTERS
        .iter()
        .take(size)
        .position(|&c| c == col_char.to_ascii_uppercase())?;
    let row: usize = std::str::from_utf8(row).ok()?.parse().ok()?;
    if row == 0 || row > size {
        return None;
    }
    Some(Point::new(col as i32, (size - row) as i32))
}

/// Inverse of [`parse_vertex`]. Columns past the last letter, which only
/// boards wider than 25 have, print as `(column,row)`.
pub fn format_vertex(point: Point, size: usize) -> String {
    let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
        return "root".into();
    };
    if x >= size || y >= size {
        return "root".into();
    }
    match COLUMN_LETTERS.get(x) {
        Some(&letter) => format!("{}{}", letter as char, size - y),
        None => format!("({x},{})", size - y),
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}

/// Protocol front-end for one [`GameSession`].
pub struct RecordEngine<S: DraftStore> {
    session: GameSession<S>,
}

impl<S: DraftStore> RecordEngine<S> {
    /// Create an engine with an empty game on the default board.
    pub fn new(store: S) -> Self {
        Self {
            session: GameSession::new(store),
        }
    }

    /// Create an engine around an existing session.
    pub fn with_session(session: GameSession<S>) -> Self {
        Self { session }
    }

    /// The session the commands act on.
    pub fn session(&self) -> &GameSession<S> {
        &self.session
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
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

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
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

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        let size = self.session.board_size();
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(s) if s == size => (true, String::new()),
                    Ok(s) => (
                        false,
                        format!("unacceptable size, only {size} is supported (got {s})"),
                    ),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.session.clear();
                (true, String::new())
            }

            "play" => {
                let (color, vertex) = match args {
                    [vertex] => (None, *vertex),
                    [color, vertex, ..] => match parse_color(color) {
                        Some(c) => (Some(c), *vertex),
                        None => return (false, format!("invalid color {color}")),
                    },
                    [] => return (false, "missing arguments".to_string()),
                };
                let to_move = self.session.next_color();
                if color.is_some_and(|c| c != to_move) {
                    return (false, format!("it is {to_move}'s turn"));
                }
                let Some(point) = parse_vertex(vertex, size) else {
                    return (false, format!("invalid vertex {vertex}"));
                };
                match self.session.play(point) {
                    Ok(node) => (true, node.id().to_string()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "undo" => {
                if self.session.previous_step() {
                    (true, self.session.tree().current_node().id().to_string())
                } else {
                    (false, "already at the first position".to_string())
                }
            }

            "redo" => {
                if self.session.next_step() {
                    (true, self.session.tree().current_node().id().to_string())
                } else {
                    (false, "no further move on the main line".to_string())
                }
            }

            "switch" => {
                let Some(id) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match self.session.switch_to_node(id) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.session.board())),

            "tree" => (true, self.describe_tree()),

            "serialize" => match self.session.tree().serialize() {
                Ok(json) => (true, json),
                Err(e) => (false, e.to_string()),
            },

            "save" => {
                if args.is_empty() {
                    return (false, "missing title".to_string());
                }
                match self.session.save(&args.join(" ")) {
                    Ok(id) => (true, id),
                    Err(e) => (false, e.to_string()),
                }
            }

            "load" => {
                let Some(id) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match self.session.load(id) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "drafts" => match self.session.store().list_drafts() {
                Ok(drafts) => {
                    let lines: Vec<String> = drafts
                        .iter()
                        .map(|d| format!("{} {}", d.id, d.title))
                        .collect();
                    (true, lines.join("\n"))
                }
                Err(e) => (false, e.to_string()),
            },

            "delete" => {
                let Some(id) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match self.session.store().delete_draft(id) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn describe_tree(&self) -> String {
        let tree = self.session.tree();
        let size = self.session.board_size();
        let current = tree.current_node().id();
        let mut out = String::new();
        for node in tree.pre_order() {
            let marker = if node.id() == current { '*' } else { ' ' };
            let indent = "  ".repeat(node.current_move_number() as usize);
            let _ = write!(out, "\n{marker}{indent}{}", node.id());
            if let Some(stone) = node.stone() {
                let _ = write!(out, " {} {}", stone.color, format_vertex(stone.point(), size));
            }
        }
        out
    }
}
