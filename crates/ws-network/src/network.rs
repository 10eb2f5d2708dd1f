//! Ward network representation and builder.
//!
//! # Data layout
//!
//! Links come in two kinds, [`LinkKind::Work`] and [`LinkKind::Play`], each
//! stored in its own [`LinkTable`] in **Compressed Sparse Row (CSR)** format.
//! Given a `WardId w`, its outgoing links of one kind occupy the slice:
//!
//! ```text
//! links[ out_start[w] .. out_start[w+1] ]
//! ```
//!
//! Within a ward, links keep the order they were added in, so a network
//! built from the same tables always iterates identically.
//!
//! # Distances
//!
//! Every link carries a distance: the explicit value given when it was
//! added, otherwise the Euclidean distance between the two wards'
//! positions, otherwise 0.  The distance range over all links is computed
//! once at build time by a single scan and cached; no symmetry between
//! `a -> b` and `b -> a` is assumed.

use log::info;

use ws_core::{DataError, DataResult, WardId};

// ── Ward / Link ───────────────────────────────────────────────────────────────

/// A ward: the smallest geographic unit with its own population.
#[derive(Clone, Debug, PartialEq)]
pub struct Ward {
    pub id: WardId,
    pub name: Option<String>,
    pub population: u64,
    /// Planar coordinate `(x, y)` used to derive link distances.
    pub position: Option<(f64, f64)>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Fixed daily commute followed by the home pool.
    Work,
    /// Leisure destination weights used by the play pool.
    Play,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Work => "work",
            LinkKind::Play => "play",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed link between two wards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Link {
    pub from: WardId,
    pub to: WardId,
    /// Raw weight, proportional to the flow along the link.
    pub weight: f64,
    /// `weight` divided by the total outgoing weight of `from` for this
    /// kind.  0 when the source has no outgoing weight.
    pub fraction: f64,
    pub distance: f64,
}

// ── LinkTable ─────────────────────────────────────────────────────────────────

/// All links of one kind, in CSR order.
#[derive(Clone, Debug, Default)]
pub struct LinkTable {
    /// CSR row pointer.  Length = `ward_count + 1`.
    pub out_start: Vec<u32>,
    pub links: Vec<Link>,
}

impl LinkTable {
    #[inline]
    pub fn out_links(&self, ward: WardId) -> &[Link] {
        let start = self.out_start[ward.index()] as usize;
        let end   = self.out_start[ward.index() + 1] as usize;
        &self.links[start..end]
    }

    #[inline]
    pub fn out_degree(&self, ward: WardId) -> usize {
        self.out_links(ward).len()
    }

    /// Sum of raw outgoing weights of `ward`.
    pub fn out_weight(&self, ward: WardId) -> f64 {
        self.out_links(ward).iter().map(|l| l.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

// ── WardNetwork ───────────────────────────────────────────────────────────────

/// The ward graph.  Read-only once built; construct with
/// [`WardNetworkBuilder`] or the CSV loader.
#[derive(Debug)]
pub struct WardNetwork {
    /// Indexed by `WardId`.
    pub wards: Vec<Ward>,
    pub work: LinkTable,
    pub play: LinkTable,
    total_population: u64,
    distance_range: (f64, f64),
}

impl WardNetwork {
    pub fn ward_count(&self) -> usize {
        self.wards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wards.is_empty()
    }

    /// Iterator over all `WardId`s in ascending order.
    pub fn ward_ids(&self) -> impl Iterator<Item = WardId> + '_ {
        (0..self.wards.len() as u32).map(WardId)
    }

    #[inline]
    pub fn population(&self, ward: WardId) -> u64 {
        self.wards[ward.index()].population
    }

    #[inline]
    pub fn total_population(&self) -> u64 {
        self.total_population
    }

    pub fn contains(&self, ward: WardId) -> bool {
        ward.index() < self.wards.len()
    }

    #[inline]
    pub fn links(&self, kind: LinkKind) -> &LinkTable {
        match kind {
            LinkKind::Work => &self.work,
            LinkKind::Play => &self.play,
        }
    }

    #[inline]
    pub fn work_links(&self, ward: WardId) -> &[Link] {
        self.work.out_links(ward)
    }

    #[inline]
    pub fn play_links(&self, ward: WardId) -> &[Link] {
        self.play.out_links(ward)
    }

    /// Smallest and largest link distance over both link kinds.
    ///
    /// Every link distance lies in the returned range and each bound is
    /// attained by at least one link.  `(0.0, 0.0)` when there are no links.
    #[inline]
    pub fn min_max_distance(&self) -> (f64, f64) {
        self.distance_range
    }
}

// ── WardNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`WardNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ws_network::WardNetworkBuilder;
///
/// let mut b = WardNetworkBuilder::new();
/// let a = b.add_ward(1_000, Some((0.0, 0.0)));
/// let c = b.add_ward(2_000, Some((3.0, 4.0)));
/// b.add_work_link(a, c, 10.0);
/// b.add_play_link(c, a, 1.0);
/// let net = b.build().unwrap();
/// assert_eq!(net.ward_count(), 2);
/// assert_eq!(net.min_max_distance(), (5.0, 5.0));
/// ```
pub struct WardNetworkBuilder {
    wards:     Vec<Ward>,
    raw_links: Vec<RawLink>,
}

struct RawLink {
    kind:     LinkKind,
    from:     WardId,
    to:       WardId,
    weight:   f64,
    distance: Option<f64>,
}

impl WardNetworkBuilder {
    pub fn new() -> Self {
        Self { wards: Vec::new(), raw_links: Vec::new() }
    }

    /// Pre-allocate for the expected number of wards and links.
    pub fn with_capacity(wards: usize, links: usize) -> Self {
        Self {
            wards:     Vec::with_capacity(wards),
            raw_links: Vec::with_capacity(links),
        }
    }

    /// Add a ward and return its `WardId` (sequential from 0).
    pub fn add_ward(&mut self, population: u64, position: Option<(f64, f64)>) -> WardId {
        let id = WardId(self.wards.len() as u32);
        self.wards.push(Ward { id, name: None, population, position });
        id
    }

    /// Add a ward with a display name.
    pub fn add_named_ward(
        &mut self,
        name:       &str,
        population: u64,
        position:   Option<(f64, f64)>,
    ) -> WardId {
        let id = self.add_ward(population, position);
        self.wards[id.index()].name = Some(name.to_owned());
        id
    }

    /// Add a directed link.  `distance = None` derives it from the ward
    /// positions at build time.
    pub fn add_link(
        &mut self,
        kind:     LinkKind,
        from:     WardId,
        to:       WardId,
        weight:   f64,
        distance: Option<f64>,
    ) {
        self.raw_links.push(RawLink { kind, from, to, weight, distance });
    }

    pub fn add_work_link(&mut self, from: WardId, to: WardId, weight: f64) {
        self.add_link(LinkKind::Work, from, to, weight, None);
    }

    pub fn add_play_link(&mut self, from: WardId, to: WardId, weight: f64) {
        self.add_link(LinkKind::Play, from, to, weight, None);
    }

    pub fn ward_count(&self) -> usize { self.wards.len() }
    pub fn link_count(&self) -> usize { self.raw_links.len() }

    /// Validate links, derive distances and fractions, and produce the
    /// network.
    ///
    /// # Errors
    ///
    /// [`DataError::UnknownWard`] for a link endpoint outside the ward
    /// range; [`DataError::InvalidLink`] for a negative or non-finite
    /// weight or distance.
    pub fn build(self) -> DataResult<WardNetwork> {
        let ward_count = self.wards.len();

        let mut work = Vec::new();
        let mut play = Vec::new();
        for raw in &self.raw_links {
            for endpoint in [raw.from, raw.to] {
                if endpoint.index() >= ward_count {
                    return Err(DataError::UnknownWard {
                        ward:    endpoint.0,
                        ward_count,
                        context: "link table",
                    });
                }
            }
            if !raw.weight.is_finite() || raw.weight < 0.0 {
                return Err(DataError::InvalidLink {
                    from:  raw.from,
                    to:    raw.to,
                    what:  "weight",
                    value: raw.weight,
                });
            }
            let distance = match raw.distance {
                Some(d) => d,
                None => derived_distance(&self.wards[raw.from.index()], &self.wards[raw.to.index()]),
            };
            if !distance.is_finite() || distance < 0.0 {
                return Err(DataError::InvalidLink {
                    from:  raw.from,
                    to:    raw.to,
                    what:  "distance",
                    value: distance,
                });
            }
            let link = Link {
                from: raw.from,
                to: raw.to,
                weight: raw.weight,
                fraction: 0.0,
                distance,
            };
            match raw.kind {
                LinkKind::Work => work.push(link),
                LinkKind::Play => play.push(link),
            }
        }

        let work = build_table(work, ward_count);
        let play = build_table(play, ward_count);
        let distance_range = scan_distance_range(&work, &play);
        let total_population = self.wards.iter().map(|w| w.population).sum();

        info!(
            "ward network: {} wards, {} work links, {} play links, population {}, distance range [{}, {}]",
            ward_count,
            work.len(),
            play.len(),
            total_population,
            distance_range.0,
            distance_range.1,
        );

        Ok(WardNetwork {
            wards: self.wards,
            work,
            play,
            total_population,
            distance_range,
        })
    }
}

impl Default for WardNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn derived_distance(a: &Ward, b: &Ward) -> f64 {
    match (a.position, b.position) {
        (Some((ax, ay)), Some((bx, by))) => ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt(),
        _ => 0.0,
    }
}

/// Stable-sort links by source, build the CSR row pointer, and fill in each
/// link's share of its source's outgoing weight.
fn build_table(mut links: Vec<Link>, ward_count: usize) -> LinkTable {
    links.sort_by_key(|l| l.from.0);

    let mut out_start = vec![0u32; ward_count + 1];
    for l in &links {
        out_start[l.from.index() + 1] += 1;
    }
    for i in 1..=ward_count {
        out_start[i] += out_start[i - 1];
    }
    debug_assert_eq!(out_start[ward_count] as usize, links.len());

    for w in 0..ward_count {
        let row = &mut links[out_start[w] as usize..out_start[w + 1] as usize];
        let total: f64 = row.iter().map(|l| l.weight).sum();
        if total > 0.0 {
            for l in row.iter_mut() {
                l.fraction = l.weight / total;
            }
        }
    }

    LinkTable { out_start, links }
}

fn scan_distance_range(work: &LinkTable, play: &LinkTable) -> (f64, f64) {
    let mut range: Option<(f64, f64)> = None;
    for l in work.links.iter().chain(play.links.iter()) {
        range = Some(match range {
            None => (l.distance, l.distance),
            Some((lo, hi)) => (lo.min(l.distance), hi.max(l.distance)),
        });
    }
    range.unwrap_or((0.0, 0.0))
}
