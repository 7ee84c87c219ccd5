use super::error::NumberingError;
use crate::core::models::chain::ChainType;
use crate::core::models::position::Position;
use crate::core::models::scheme::Scheme;

const INSERTION_CODES: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// The stretch of sequence between two consecutive anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentId {
    /// N-terminus up to and including the first cysteine.
    Head,
    /// First cysteine (exclusive) to the conserved tryptophan.
    FirstLoop,
    /// Tryptophan (exclusive) to the second cysteine.
    SecondLoop,
    /// Second cysteine (exclusive) to the J-region motif residue.
    ThirdLoop,
    /// Everything after the J-region motif residue.
    Tail,
}

impl SegmentId {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentId::Head => "N-terminus to first cysteine",
            SegmentId::FirstLoop => "first cysteine to tryptophan",
            SegmentId::SecondLoop => "tryptophan to second cysteine",
            SegmentId::ThirdLoop => "second cysteine to J motif",
            SegmentId::Tail => "J motif to C-terminus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Exactly one residue per slot.
    Fixed,
    /// Absorbs length variation: extra residues become insertion codes after
    /// `insert_after`, missing residues vacate slots in `deletion_order`.
    Variable {
        insert_after: Option<u16>,
        deletion_order: &'static [u16],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub slots: Vec<Position>,
    pub kind: BlockKind,
}

impl Block {
    fn fixed(slots: Vec<Position>) -> Self {
        Self {
            slots,
            kind: BlockKind::Fixed,
        }
    }

    fn variable(
        slots: Vec<Position>,
        insert_after: Option<u16>,
        deletion_order: &'static [u16],
    ) -> Self {
        Self {
            slots,
            kind: BlockKind::Variable {
                insert_after,
                deletion_order,
            },
        }
    }

    fn min_len(&self) -> usize {
        match &self.kind {
            BlockKind::Fixed => self.slots.len(),
            BlockKind::Variable { deletion_order, .. } => {
                self.slots.len().saturating_sub(deletion_order.len())
            }
        }
    }

    fn max_len(&self) -> usize {
        match &self.kind {
            BlockKind::Variable {
                insert_after: Some(_),
                ..
            } => self.slots.len() + INSERTION_CODES.len(),
            _ => self.slots.len(),
        }
    }

    /// Labels `count` residues; `count` must lie within `min_len..=max_len`.
    fn label(&self, count: usize) -> Vec<Position> {
        let (insert_after, deletion_order) = match &self.kind {
            BlockKind::Fixed => return self.slots.clone(),
            BlockKind::Variable {
                insert_after,
                deletion_order,
            } => (*insert_after, *deletion_order),
        };

        if count >= self.slots.len() {
            let extra = count - self.slots.len();
            let mut labels = Vec::with_capacity(count);
            for &slot in &self.slots {
                labels.push(slot);
                if extra > 0 && slot.insertion.is_none() && Some(slot.number) == insert_after {
                    labels.extend(
                        INSERTION_CODES[..extra]
                            .iter()
                            .map(|&code| Position::with_insertion(slot.number, code)),
                    );
                }
            }
            labels
        } else {
            let vacated = &deletion_order[..self.slots.len() - count];
            self.slots
                .iter()
                .filter(|slot| !vacated.contains(&slot.number))
                .copied()
                .collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: SegmentId,
    pub blocks: Vec<Block>,
}

impl Segment {
    pub fn base_slots(&self) -> impl Iterator<Item = Position> + '_ {
        self.blocks.iter().flat_map(|b| b.slots.iter().copied())
    }

    /// Labels a segment whose both ends sit on anchors.
    pub fn label_anchored(&self, count: usize) -> Result<Vec<Position>, NumberingError> {
        let min: usize = self.blocks.iter().map(Block::min_len).sum();
        let max: usize = self.blocks.iter().map(Block::max_len).sum();
        if count < min {
            return Err(NumberingError::SegmentTooShort {
                segment: self.id.name(),
                length: count,
                required: min,
            });
        }
        if count > max {
            return Err(NumberingError::SegmentTooLong {
                segment: self.id.name(),
                length: count,
                capacity: max,
            });
        }

        let fixed: usize = self
            .blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Fixed)
            .map(|b| b.slots.len())
            .sum();
        let variable_count = count - fixed;
        Ok(self
            .blocks
            .iter()
            .flat_map(|block| match block.kind {
                BlockKind::Fixed => block.label(block.slots.len()),
                BlockKind::Variable { .. } => block.label(variable_count),
            })
            .collect())
    }

    /// Labels residues from the first slot onwards. Returns the labels and the
    /// number of trailing residues that did not fit.
    pub fn label_from_start(&self, count: usize, skip_last_block: bool) -> (Vec<Position>, usize) {
        let used_blocks = if skip_last_block {
            &self.blocks[..self.blocks.len().saturating_sub(1)]
        } else {
            &self.blocks[..]
        };
        let slots: Vec<Position> = used_blocks
            .iter()
            .flat_map(|b| b.slots.iter().copied())
            .collect();
        let taken = count.min(slots.len());
        (slots[..taken].to_vec(), count - taken)
    }

    /// Labels residues so the last one lands on the last slot. Returns the
    /// labels and the number of leading residues that did not fit.
    pub fn label_to_end(&self, count: usize) -> (Vec<Position>, usize) {
        let slots: Vec<Position> = self.base_slots().collect();
        let taken = count.min(slots.len());
        (slots[slots.len() - taken..].to_vec(), count - taken)
    }
}

/// Scheme positions of the four anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPositions {
    pub cys1: Position,
    pub trp: Position,
    pub cys2: Position,
    pub j_motif: Position,
}

impl AnchorPositions {
    /// The three framework anchors every V-gene template must carry.
    pub fn framework(&self) -> [Position; 3] {
        [self.cys1, self.trp, self.cys2]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeLayout {
    scheme: Scheme,
    chain_type: ChainType,
    segments: [Segment; 5],
}

impl SchemeLayout {
    pub fn new(scheme: Scheme, chain_type: ChainType) -> Self {
        let blocks = match scheme {
            Scheme::Kabat | Scheme::Chothia => kabat_like(scheme, chain_type),
            Scheme::Imgt => imgt(chain_type),
            Scheme::Aho => aho(chain_type),
        };
        let ids = [
            SegmentId::Head,
            SegmentId::FirstLoop,
            SegmentId::SecondLoop,
            SegmentId::ThirdLoop,
            SegmentId::Tail,
        ];
        let mut blocks = blocks.into_iter();
        let segments = ids.map(|id| Segment {
            id,
            blocks: blocks.next().unwrap_or_default(),
        });
        Self {
            scheme,
            chain_type,
            segments,
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn segment(&self, id: SegmentId) -> &Segment {
        let index = match id {
            SegmentId::Head => 0,
            SegmentId::FirstLoop => 1,
            SegmentId::SecondLoop => 2,
            SegmentId::ThirdLoop => 3,
            SegmentId::Tail => 4,
        };
        &self.segments[index]
    }

    pub fn segments(&self) -> &[Segment; 5] {
        &self.segments
    }

    pub fn anchor_positions(&self) -> AnchorPositions {
        let last = |id: SegmentId| self.segment(id).base_slots().last();
        AnchorPositions {
            cys1: last(SegmentId::Head).unwrap_or(Position::new(0)),
            trp: last(SegmentId::FirstLoop).unwrap_or(Position::new(0)),
            cys2: last(SegmentId::SecondLoop).unwrap_or(Position::new(0)),
            j_motif: last(SegmentId::ThirdLoop).unwrap_or(Position::new(0)),
        }
    }
}

fn span(start: u16, end: u16) -> Vec<Position> {
    (start..=end).map(Position::new).collect()
}

fn span_without(start: u16, end: u16, gaps: &[u16]) -> Vec<Position> {
    (start..=end)
        .filter(|n| !gaps.contains(n))
        .map(Position::new)
        .collect()
}

fn kabat_like(scheme: Scheme, chain_type: ChainType) -> [Vec<Block>; 5] {
    let chothia = scheme == Scheme::Chothia;
    if chain_type.is_heavy() {
        let mut fr3 = span(66, 82);
        fr3.extend(['A', 'B', 'C'].map(|c| Position::with_insertion(82, c)));
        fr3.extend(span(83, 92));
        [
            vec![Block::fixed(span(1, 22))],
            vec![
                if chothia {
                    Block::variable(span(23, 35), Some(31), &[31, 30])
                } else {
                    Block::variable(span(23, 35), Some(35), &[35, 34])
                },
                Block::fixed(span(36, 36)),
            ],
            vec![
                Block::fixed(span(37, 49)),
                Block::variable(span(50, 65), Some(52), &[52, 53, 54]),
                Block::fixed(fr3),
            ],
            vec![
                Block::fixed(span(93, 94)),
                Block::variable(span(95, 102), Some(100), &[100, 99, 98, 97, 96, 101, 95]),
                Block::fixed(span(103, 103)),
            ],
            vec![Block::fixed(span(104, 113))],
        ]
    } else {
        let head = match chain_type {
            ChainType::Lambda => span_without(1, 23, &[10]),
            _ => span(1, 23),
        };
        [
            vec![Block::fixed(head)],
            vec![
                if chothia {
                    Block::variable(span(24, 34), Some(30), &[30, 29, 28, 31])
                } else {
                    Block::variable(span(24, 34), Some(27), &[28, 29, 30, 31])
                },
                Block::fixed(span(35, 35)),
            ],
            vec![
                Block::fixed(span(36, 49)),
                Block::variable(span(50, 56), Some(54), &[54, 55, 53]),
                Block::fixed(span(57, 88)),
            ],
            vec![
                Block::variable(span(89, 97), Some(95), &[95, 94, 96, 93, 92]),
                Block::fixed(span(98, 98)),
            ],
            vec![Block::fixed(span(99, 107))],
        ]
    }
}

fn imgt(chain_type: ChainType) -> [Vec<Block>; 5] {
    let head = match chain_type {
        ChainType::Kappa => span(1, 23),
        _ => span_without(1, 23, &[10]),
    };
    let fr3 = if chain_type.is_heavy() {
        span_without(66, 104, &[73])
    } else {
        span_without(66, 104, &[73, 81, 82])
    };
    [
        vec![Block::fixed(head)],
        vec![
            Block::fixed(span(24, 26)),
            Block::variable(
                span(27, 38),
                Some(32),
                &[32, 33, 31, 34, 30, 35, 29, 36, 28, 37],
            ),
            Block::fixed(span(39, 41)),
        ],
        vec![
            Block::fixed(span(42, 55)),
            Block::variable(span(56, 65), Some(60), &[61, 60, 62, 59, 63, 58, 64, 57]),
            Block::fixed(fr3),
        ],
        vec![
            Block::variable(
                span(105, 117),
                Some(111),
                &[112, 111, 113, 110, 114, 109, 115, 108, 116, 107, 106],
            ),
            Block::fixed(span(118, 118)),
        ],
        vec![Block::fixed(span(119, 128))],
    ]
}

const AHO_LOOP1_DELETIONS: [u16; 14] = [32, 33, 31, 34, 30, 35, 29, 36, 28, 37, 27, 38, 26, 39];
const AHO_LOOP2_DELETIONS: [u16; 18] = [
    68, 67, 69, 66, 70, 65, 71, 64, 72, 63, 73, 62, 74, 61, 75, 60, 76, 59,
];
const AHO_LOOP3_DELETIONS: [u16; 30] = [
    123, 122, 124, 121, 125, 120, 126, 119, 127, 118, 128, 117, 129, 116, 130, 115, 131, 114,
    132, 113, 133, 112, 134, 111, 135, 110, 136, 109, 137, 108,
];

fn aho(chain_type: ChainType) -> [Vec<Block>; 5] {
    let head = match chain_type {
        ChainType::Kappa => span(1, 23),
        _ => span_without(1, 23, &[10]),
    };
    [
        vec![Block::fixed(head)],
        vec![
            Block::fixed(span(24, 24)),
            Block::variable(span(25, 40), None, &AHO_LOOP1_DELETIONS),
            Block::fixed(span(41, 43)),
        ],
        vec![
            Block::fixed(span(44, 57)),
            Block::variable(span(58, 77), None, &AHO_LOOP2_DELETIONS),
            Block::fixed(span(78, 106)),
        ],
        vec![
            Block::variable(span(107, 138), None, &AHO_LOOP3_DELETIONS),
            Block::fixed(span(139, 139)),
        ],
        vec![Block::fixed(span(140, 149))],
    ]
}
