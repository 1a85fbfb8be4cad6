//! A game being recorded: one move tree, the rules that guard it and the
//! store its drafts go to.

use log::{debug, info};

use crate::board::{Board, Color, Point, Stone};
use crate::capture::{CaptureService, MoveError};
use crate::constants::N;
use crate::error::TreeError;
use crate::node::MoveNode;
use crate::store::{DraftStore, Result as StoreResult, StoreError};
use crate::tree::MoveTree;

pub struct GameSession<S: DraftStore> {
    tree: MoveTree,
    capture: CaptureService,
    /// Projection of `tree` at its pointer, refreshed after every change.
    board: Board,
    store: S,
    draft_id: Option<String>,
}

impl<S: DraftStore> GameSession<S> {
    /// Start an empty game on the default `N`x`N` board.
    pub fn new(store: S) -> Self {
        Self::with_board_size(N, store)
    }

    /// Start an empty game on a `size`x`size` board.
    pub fn with_board_size(size: usize, store: S) -> Self {
        Self {
            tree: MoveTree::new(),
            capture: CaptureService::new(size),
            board: Board::new(size),
            store,
            draft_id: None,
        }
    }

    /// The game record.
    pub fn tree(&self) -> &MoveTree {
        &self.tree
    }

    /// The position at the tree's cursor.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side length of the board.
    pub fn board_size(&self) -> usize {
        self.capture.board_size()
    }

    /// The draft store this session saves to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Id of the draft this game was last saved to or loaded from.
    pub fn draft_id(&self) -> Option<&str> {
        self.draft_id.as_deref()
    }

    /// Color of the side to move.
    pub fn next_color(&self) -> Color {
        self.tree.next_color()
    }

    fn refresh(&mut self) {
        self.board = self.tree.board(self.capture.board_size());
    }

    /// The hover preview: `point` if the side to move could play there.
    pub fn hover(&self, point: Option<Point>) -> Option<Point> {
        let stone = point.map(|p| Stone::at(p, self.next_color()));
        self.capture
            .is_legal_move(stone.as_ref(), &self.board)
            .then_some(point)
            .flatten()
    }

    /// Play the side to move at `point`.
    pub fn play(&mut self, point: Point) -> Result<&MoveNode, MoveError> {
        let stone = Stone::at(point, self.next_color());
        self.capture.check_move(&stone, &self.board)?;
        let captured = self.capture.captured_groups(&stone, &self.board);
        self.tree.add_move(stone, captured);
        self.refresh();
        Ok(self.tree.current_node())
    }

    /// Undo one move. Returns `false` at the root.
    pub fn previous_step(&mut self) -> bool {
        let moved = self.tree.previous_step();
        if moved {
            self.refresh();
        }
        moved
    }

    /// Redo along the main line. Returns `false` at a leaf.
    pub fn next_step(&mut self) -> bool {
        let moved = self.tree.next_step();
        if moved {
            self.refresh();
        }
        moved
    }

    /// Jump to node `id` and re-project the board.
    pub fn switch_to_node(&mut self, id: &str) -> Result<(), TreeError> {
        self.tree.switch_to_node(id)?;
        self.refresh();
        Ok(())
    }

    /// Start a new game. The next save creates a new draft.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.draft_id = None;
        self.refresh();
    }

    /// Snapshot the tree into the store, overwriting this game's draft if it
    /// has one.
    pub fn save(&mut self, title: &str) -> StoreResult<String> {
        let id = self
            .store
            .save_draft(&self.tree, title, self.draft_id.as_deref())?;
        info!("saved draft {id} ({title})");
        self.draft_id = Some(id.clone());
        Ok(id)
    }

    /// Replace the current game with draft `id`.
    pub fn load(&mut self, id: &str) -> StoreResult<()> {
        let tree = self
            .store
            .load_draft(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!("loaded draft {id} with {} nodes", tree.len());
        self.tree = tree;
        self.draft_id = Some(id.to_string());
        self.refresh();
        Ok(())
    }

    /// Replace the current game with an already deserialized tree.
    pub fn replace_tree(&mut self, tree: MoveTree) {
        self.tree = tree;
        self.draft_id = None;
        self.refresh();
    }
}
