//! Implementation of constructors for adaptive octrees.
use std::{collections::VecDeque, ops::Range};

use itertools::{izip, Itertools};
use log::debug;
use rayon::prelude::*;

use crate::{
    traits::{general::Scalar, tree::FmmTree},
    tree::{
        constants::DEEPEST_LEVEL,
        types::{Body, BoundingBox, Domain, MortonKey, Octree, OctreeBox, Point, TreeConstruction},
    },
};

/// A box under construction during a bottom-up build, owning its children until flattened.
struct Cluster {
    key: MortonKey,
    bodies: Range<usize>,
    children: Vec<Cluster>,
}

impl<T, C> Octree<T, C>
where
    T: Scalar,
    C: Clone + Send + Sync,
{
    /// Create an empty octree over a fixed bounding box, bodies are added with [`Octree::construct`].
    ///
    /// # Arguments
    /// * `bounding_box` - Region the tree is defined over, every body must lie inside it.
    pub fn new(bounding_box: BoundingBox<T>) -> Self {
        Octree {
            bounding_box,
            domain: Domain::from_bounding_box(&bounding_box),
            bodies: Vec::new(),
            boxes: Vec::new(),
            levels: Vec::new(),
            depth: 0,
            n_leaves: 0,
            n_crit: 0,
            max_level: 0,
            construction: None,
        }
    }

    /// Compute the bounding box of a set of points and build an octree over them.
    ///
    /// # Arguments
    /// * `points` - Body positions, must be non-empty.
    /// * `charges` - Body charges, one per point.
    /// * `construction` - Whether to build top-down or bottom-up.
    /// * `n_crit` - Maximum number of bodies per leaf.
    /// * `max_level` - Level beyond which boxes are never split.
    pub fn from_points(
        points: &[Point<T>],
        charges: &[C],
        construction: TreeConstruction,
        n_crit: usize,
        max_level: u64,
    ) -> Result<Self, std::io::Error> {
        let bounding_box = BoundingBox::from_points(points)?;
        let mut tree = Octree::new(bounding_box);
        tree.construct(points, charges, construction, n_crit, max_level)?;
        Ok(tree)
    }

    /// Bucket bodies into boxes, splitting every box holding more than `n_crit` bodies until
    /// `max_level` is reached. Top-down and bottom-up construction yield identical trees.
    ///
    /// An empty set of points results in a tree consisting of a single empty root leaf.
    ///
    /// # Arguments
    /// * `points` - Body positions, each must lie inside the bounding box of the tree.
    /// * `charges` - Body charges, one per point.
    /// * `construction` - Whether to build top-down or bottom-up.
    /// * `n_crit` - Maximum number of bodies per leaf, must be positive.
    /// * `max_level` - Level beyond which boxes are never split, at most [`DEEPEST_LEVEL`].
    pub fn construct(
        &mut self,
        points: &[Point<T>],
        charges: &[C],
        construction: TreeConstruction,
        n_crit: usize,
        max_level: u64,
    ) -> Result<(), std::io::Error> {
        if self.construction.is_some() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Octree has already been constructed",
            ));
        }

        if points.len() != charges.len() {
            let msg = format!(
                "Number of points ({}) does not match number of charges ({})",
                points.len(),
                charges.len()
            );
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg));
        }

        if n_crit == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Leaf capacity n_crit must be positive",
            ));
        }

        if max_level > DEEPEST_LEVEL {
            let msg = format!(
                "Invalid maximum level, max_level={} > max allowed depth={}",
                max_level, DEEPEST_LEVEL
            );
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg));
        }

        // Encode every body on the deepest level, and sort along the Morton curve
        let domain = self.domain;
        let keys = points
            .par_iter()
            .map(|point| MortonKey::from_point(point, &domain, DEEPEST_LEVEL))
            .collect::<Result<Vec<_>, _>>()?;

        let mut bodies = izip!(points, charges, keys)
            .enumerate()
            .map(|(index, (&point, charge, key))| Body {
                point,
                charge: charge.clone(),
                index,
                key,
            })
            .collect_vec();

        bodies.par_sort_by_key(|body| body.key);

        let boxes = match construction {
            TreeConstruction::TopDown => Self::top_down(&bodies, n_crit, max_level),
            TreeConstruction::BottomUp => Self::bottom_up(&bodies, n_crit, max_level),
        };

        self.bodies = bodies;
        self.n_crit = n_crit;
        self.max_level = max_level;
        self.finalise(boxes, construction);

        debug!(
            "Constructed {} octree: {} bodies, {} boxes, {} leaves, depth {}",
            construction,
            self.bodies.len(),
            self.boxes.len(),
            self.n_leaves,
            self.depth
        );

        Ok(())
    }

    /// Breadth first splitting of boxes, children are appended in Morton order so that the
    /// resulting array is sorted by level and then by Morton key.
    fn top_down(bodies: &[Body<T, C>], n_crit: usize, max_level: u64) -> Vec<OctreeBox> {
        let mut boxes = vec![OctreeBox {
            index: 0,
            key: MortonKey::root(),
            parent: None,
            children: 0..0,
            bodies: 0..bodies.len(),
        }];

        let mut current = 0;
        while current < boxes.len() {
            let key = boxes[current].key;
            let range = boxes[current].bodies.clone();
            let level = key.level();

            if range.len() > n_crit && level < max_level {
                let first = boxes.len();
                let mut start = range.start;

                for child in key.children() {
                    let end = start
                        + bodies[start..range.end]
                            .partition_point(|body| body.key.ancestor(level + 1) <= child);

                    if end > start {
                        boxes.push(OctreeBox {
                            index: boxes.len(),
                            key: child,
                            parent: Some(current),
                            children: 0..0,
                            bodies: start..end,
                        });
                    }
                    start = end;
                }

                boxes[current].children = first..boxes.len();
            }

            current += 1;
        }

        boxes
    }

    /// Bucket bodies on the maximum level, then merge groups of siblings level by level. A group
    /// holding at most `n_crit` bodies collapses into a single leaf.
    fn bottom_up(bodies: &[Body<T, C>], n_crit: usize, max_level: u64) -> Vec<OctreeBox> {
        let finest = bodies
            .iter()
            .enumerate()
            .chunk_by(|(_, body)| body.key.ancestor(max_level));

        let mut clusters = Vec::new();
        for (key, group) in &finest {
            let (start, end) = group.fold((usize::MAX, 0), |(start, end), (index, _)| {
                (start.min(index), end.max(index + 1))
            });
            clusters.push(Cluster {
                key,
                bodies: start..end,
                children: Vec::new(),
            });
        }

        for level in (0..max_level).rev() {
            let parents = clusters
                .into_iter()
                .chunk_by(|cluster| cluster.key.ancestor(level));

            let mut merged = Vec::new();
            for (key, group) in &parents {
                let children = group.collect_vec();
                let start = children.first().map_or(0, |c| c.bodies.start);
                let end = children.last().map_or(0, |c| c.bodies.end);

                let children = if end - start > n_crit {
                    children
                } else {
                    Vec::new()
                };

                merged.push(Cluster {
                    key,
                    bodies: start..end,
                    children,
                });
            }
            clusters = merged;
        }

        let root = clusters.pop().unwrap_or(Cluster {
            key: MortonKey::root(),
            bodies: 0..0,
            children: Vec::new(),
        });

        // Flatten breadth first, siblings are popped consecutively and so receive contiguous indices
        let mut boxes: Vec<OctreeBox> = Vec::new();
        let mut queue = VecDeque::from([(root, None)]);

        while let Some((cluster, parent)) = queue.pop_front() {
            let index = boxes.len();
            boxes.push(OctreeBox {
                index,
                key: cluster.key,
                parent,
                children: 0..0,
                bodies: cluster.bodies,
            });

            if let Some(parent) = parent {
                let children = &mut boxes[parent].children;
                if children.start == children.end {
                    *children = index..index + 1;
                } else {
                    children.end = index + 1;
                }
            }

            for child in cluster.children {
                queue.push_back((child, Some(index)));
            }
        }

        boxes
    }

    /// Index boxes by level and record summary statistics.
    fn finalise(&mut self, boxes: Vec<OctreeBox>, construction: TreeConstruction) {
        // Boxes are sorted by level, so the last is the deepest
        self.depth = boxes.last().map_or(0, |b| b.key.level());

        self.levels = (0..=self.depth)
            .map(|level| {
                let start = boxes.partition_point(|b| b.key.level() < level);
                let end = boxes.partition_point(|b| b.key.level() <= level);
                start..end
            })
            .collect();

        self.n_leaves = boxes.iter().filter(|b| b.children.is_empty()).count();
        self.boxes = boxes;
        self.construction = Some(construction);
    }

    /// Whether bodies have been added to this tree.
    pub fn is_constructed(&self) -> bool {
        self.construction.is_some()
    }

    /// Iterator over all leaf boxes, in level then Morton order.
    pub fn leaves(&self) -> impl Iterator<Item = &OctreeBox> {
        self.boxes.iter().filter(|b| b.children.is_empty())
    }
}

impl<T, C> FmmTree for Octree<T, C>
where
    T: Scalar,
    C: Clone + Send + Sync,
{
    type Scalar = T;
    type Charge = C;
    type Node = MortonKey;
    type Domain = Domain<T>;

    fn root(&self) -> usize {
        0
    }

    fn n_boxes(&self) -> usize {
        self.boxes.len()
    }

    fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    fn n_bodies(&self) -> usize {
        self.bodies.len()
    }

    fn depth(&self) -> u64 {
        self.depth
    }

    fn domain(&self) -> &Self::Domain {
        &self.domain
    }

    fn node(&self, index: usize) -> Option<&OctreeBox> {
        self.boxes.get(index)
    }

    fn all_nodes(&self) -> &[OctreeBox] {
        &self.boxes
    }

    fn key(&self, index: usize) -> Option<&Self::Node> {
        self.boxes.get(index).map(|b| &b.key)
    }

    fn children(&self, index: usize) -> Range<usize> {
        self.boxes.get(index).map_or(0..0, |b| b.children.clone())
    }

    fn level(&self, level: u64) -> Option<Range<usize>> {
        self.levels.get(level as usize).cloned()
    }

    fn bodies(&self, index: usize) -> &[Body<T, C>] {
        &self.bodies[self.body_range(index)]
    }

    fn body_range(&self, index: usize) -> Range<usize> {
        self.boxes.get(index).map_or(0..0, |b| b.bodies.clone())
    }

    fn all_bodies(&self) -> &[Body<T, C>] {
        &self.bodies
    }

    fn centre(&self, index: usize) -> Point<T> {
        self.boxes[index].key.centre(&self.domain)
    }

    fn side_length(&self, index: usize) -> T {
        self.boxes[index].key.diameter(&self.domain)[0]
    }

    fn radius(&self, index: usize) -> T {
        self.side_length(index) * T::real(3.0).sqrt() / T::real(2.0)
    }
}
