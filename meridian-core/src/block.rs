use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Text,
    Image,
    Table,
    Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockDataFormat {
    Plain,
    Markdown,
    Base64,
    Json,
}

/// An ordered content fragment inside a [`crate::Record`]; the unit of
/// citation (spec §3 "Block and BlockGroup").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: usize,
    pub block_type: BlockType,
    pub data_format: BlockDataFormat,
    pub data: String,
    /// Assigned at LLM-prompt construction time; synced back to retrieval
    /// results for citation round-tripping (spec Invariant 3).
    pub block_number: Option<u32>,
}

impl Block {
    pub fn new(index: usize, block_type: BlockType, data_format: BlockDataFormat, data: impl Into<String>) -> Self {
        Self { index, block_type, data_format, data: data.into(), block_number: None }
    }

    /// Stable identity for deduplication purposes: same type + data content.
    pub fn identity_key(&self) -> String {
        format!("{:?}:{}", self.block_type, self.data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockGroup {
    pub name: String,
    pub blocks: Vec<Block>,
}

/// `{ blocks, block_groups }` as carried through the transform and
/// retrieval layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlocksContainer {
    pub blocks: Vec<Block>,
    pub block_groups: Vec<BlockGroup>,
}

impl BlocksContainer {
    /// Assign sequential block numbers to every top-level block, in index
    /// order, returning the highest number assigned (0 if empty). This is
    /// what the agent's prompt-construction step calls before handing
    /// blocks to the LLM (spec §3, §4.J `conditional_retrieve`).
    pub fn assign_block_numbers(&mut self, starting_at: u32) -> u32 {
        let mut next = starting_at;
        let mut ordered: Vec<&mut Block> = self.blocks.iter_mut().collect();
        ordered.sort_by_key(|b| b.index);
        for block in ordered {
            block.block_number = Some(next);
            next += 1;
        }
        next.saturating_sub(1).max(starting_at.saturating_sub(1))
    }

    pub fn block_by_number(&self, number: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_number == Some(number))
    }
}
