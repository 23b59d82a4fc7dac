use serde::Serialize;
use utoipa::ToSchema;

use crate::state::board::Board;

/// A valid arrangement clients may submit as-is.
#[derive(Debug, Serialize, ToSchema)]
pub struct RandomBoardResponse {
    /// 25 distinct numbers in row-major order.
    pub cells: Vec<u8>,
}

impl From<Board> for RandomBoardResponse {
    fn from(board: Board) -> Self {
        Self {
            cells: board.cells().to_vec(),
        }
    }
}
