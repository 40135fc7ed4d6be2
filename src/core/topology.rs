use crate::core::MobilizedBodyId;

/// One mobilized body as seen by topology realization
#[derive(Debug, Clone, Copy)]
pub(crate) struct TopologyEntry {
    pub(crate) id: MobilizedBodyId,
    pub(crate) parent: Option<MobilizedBodyId>,
    pub(crate) nq: usize,
    pub(crate) nu: usize,
}

/// Index tables derived from the tree shape
///
/// Valid only for the topology version it was built for; any structural edit
/// discards it.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyCache {
    /// Topology version this cache was realized for
    version: u64,

    /// (start, count) into the q array, indexed by mobilized body id
    q_ranges: Vec<(usize, usize)>,

    /// (start, count) into the u array, indexed by mobilized body id
    u_ranges: Vec<(usize, usize)>,

    /// Distance from ground, indexed by mobilized body id
    levels: Vec<usize>,

    /// Direct children, indexed by mobilized body id
    children: Vec<Vec<MobilizedBodyId>>,

    nq: usize,
    nu: usize,
}

impl TopologyCache {
    /// Builds the tables from entries listed in id order
    ///
    /// Parents always precede their children in id order, so offsets and
    /// levels can be assigned in a single pass.
    pub(crate) fn build(version: u64, entries: impl IntoIterator<Item = TopologyEntry>) -> Self {
        let mut cache = Self {
            version,
            q_ranges: Vec::new(),
            u_ranges: Vec::new(),
            levels: Vec::new(),
            children: Vec::new(),
            nq: 0,
            nu: 0,
        };

        for entry in entries {
            debug_assert_eq!(entry.id.index(), cache.levels.len());

            cache.q_ranges.push((cache.nq, entry.nq));
            cache.u_ranges.push((cache.nu, entry.nu));
            cache.nq += entry.nq;
            cache.nu += entry.nu;

            let level = match entry.parent {
                Some(parent) => {
                    cache.children[parent.index()].push(entry.id);
                    cache.levels[parent.index()] + 1
                }
                None => 0,
            };
            cache.levels.push(level);
            cache.children.push(Vec::new());
        }

        cache
    }

    /// Topology version this cache belongs to
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Total number of generalized coordinates
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Total number of generalized speeds
    pub fn nu(&self) -> usize {
        self.nu
    }

    /// Number of mobilized bodies, ground included
    pub fn num_mobilized_bodies(&self) -> usize {
        self.levels.len()
    }

    /// Start offset and width of a mobilizer's coordinates
    pub fn q_range(&self, id: MobilizedBodyId) -> Option<(usize, usize)> {
        self.q_ranges.get(id.index()).copied()
    }

    /// Start offset and width of a mobilizer's speeds
    pub fn u_range(&self, id: MobilizedBodyId) -> Option<(usize, usize)> {
        self.u_ranges.get(id.index()).copied()
    }

    /// Number of mobilizers between a body and ground
    pub fn level(&self, id: MobilizedBodyId) -> Option<usize> {
        self.levels.get(id.index()).copied()
    }

    /// Direct children of a mobilized body, in id order
    pub fn children(&self, id: MobilizedBodyId) -> &[MobilizedBodyId] {
        self.children.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }
}
