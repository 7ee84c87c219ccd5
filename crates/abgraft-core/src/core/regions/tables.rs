use phf::{Map, phf_map};

/// First position number of CDR1, FR2, CDR2, FR3, CDR3, FR4, and one past the
/// last FR4 position.
pub(super) type Borders = [u16; 7];

pub(super) static REGION_BORDERS: Map<&'static str, Borders> = phf_map! {
    "imgt" => [27, 39, 56, 66, 105, 118, 129],
    "kabat_H" => [31, 36, 50, 66, 95, 103, 114],
    "kabat_L" => [24, 35, 50, 57, 89, 98, 108],
    "chothia_H" => [26, 33, 52, 57, 95, 103, 114],
    "chothia_L" => [24, 35, 50, 57, 89, 98, 108],
    "north_H" => [23, 36, 50, 59, 93, 103, 114],
    "north_L" => [24, 35, 49, 57, 89, 98, 108],
};

// Keyed by numbering scheme; Chothia shares the Kabat framework numbers.
pub(super) static VERNIER_POSITIONS: Map<&'static str, &'static [u16]> = phf_map! {
    "kabat_H" => &[2, 27, 28, 29, 30, 47, 48, 49, 67, 69, 71, 73, 78, 93, 94, 103],
    "kabat_L" => &[2, 4, 35, 36, 46, 47, 48, 49, 64, 66, 68, 69, 71, 98],
    "imgt_H" => &[2, 28, 29, 30, 35, 52, 53, 54, 76, 78, 80, 82, 87, 105, 106, 118],
    "imgt_L" => &[2, 4, 41, 42, 52, 53, 54, 55, 78, 80, 84, 85, 87, 118],
};
