use serde::{Deserialize, Serialize};

/// Wire format for a location: `(contig_id, anchor, strand, length)`.
type LocationTuple = (String, i64, String, i64);

/// A strand-encoded genomic location segment.
///
/// `anchor` is the 5'-proximal coordinate in reading direction: the lowest
/// genomic coordinate on the `+` strand, the highest on the `-` strand.
/// Coordinates are 1-based and `length >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LocationTuple", into = "LocationTuple")]
pub struct Location {
    pub contig_id: String,
    pub anchor: i64,
    pub strand: String,
    pub length: i64,
}

impl From<LocationTuple> for Location {
    fn from((contig_id, anchor, strand, length): LocationTuple) -> Self {
        Location {
            contig_id,
            anchor,
            strand,
            length,
        }
    }
}

impl From<Location> for LocationTuple {
    fn from(loc: Location) -> Self {
        (loc.contig_id, loc.anchor, loc.strand, loc.length)
    }
}

impl Location {
    pub fn new(contig_id: &str, anchor: i64, strand: &str, length: i64) -> Self {
        Location {
            contig_id: contig_id.to_string(),
            anchor,
            strand: strand.to_string(),
            length,
        }
    }

    /// Lowest genomic coordinate of the segment.
    ///
    /// Strands other than `+`/`-` return `0`, matching legacy behavior.
    /// Do not "fix" this: downstream consumers rely on the sentinel.
    pub fn start(&self) -> i64 {
        match self.strand.as_str() {
            "+" => self.anchor,
            "-" => self.anchor - (self.length - 1),
            _ => 0,
        }
    }

    /// Highest genomic coordinate of the segment (same `0` sentinel).
    pub fn end(&self) -> i64 {
        match self.strand.as_str() {
            "+" => self.anchor + (self.length - 1),
            "-" => self.anchor,
            _ => 0,
        }
    }

    /// The 3' boundary in reading direction, one past the last base.
    pub fn bio_end(&self) -> i64 {
        if self.strand == "+" {
            self.anchor + self.length
        } else {
            self.anchor - self.length
        }
    }

    /// True when `other` lies entirely within this segment on the same
    /// contig and strand.
    pub fn contains(&self, other: &Location) -> bool {
        if self.contig_id != other.contig_id || self.strand != other.strand {
            return false;
        }
        if self.strand == "+" {
            other.anchor >= self.anchor
                && other.anchor + other.length <= self.anchor + self.length
        } else {
            other.anchor <= self.anchor
                && other.anchor - other.length >= self.anchor - self.length
        }
    }

    /// Merges a compound location into its overall envelope. The contig and
    /// strand are taken from the first segment.
    ///
    /// Panics on an empty slice; every feature carries at least one segment.
    pub fn common(locations: &[Location]) -> Location {
        let contig_id = locations[0].contig_id.clone();
        let strand = locations[0].strand.clone();
        let min_pos = locations.iter().map(Location::start).min().unwrap_or(0);
        let max_pos = locations.iter().map(Location::end).max().unwrap_or(0);
        let length = max_pos - min_pos + 1;
        let anchor = if strand == "+" { min_pos } else { max_pos };
        Location {
            contig_id,
            anchor,
            strand,
            length,
        }
    }
}
