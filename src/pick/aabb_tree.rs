//! Static bounding-volume hierarchy over primitive bounding boxes
//!
//! Built offline in bulk: primitive centroids are quantized to Morton keys
//! against the fixed world bounds, sorted, and the sorted run is split at
//! its midpoint recursively. The midpoint split trades optimal partitions
//! for a guaranteed-balanced tree and an O(N log N) build. Nodes live in one
//! contiguous arena and reference children by index, so teardown and rebuild
//! are a single buffer swap.

use rayon::prelude::*;

use crate::math::{Aabb, Frustum, MortonCoder, Ray, WORLD_BOUNDS};

struct Node<T> {
    bounds: Aabb,
    kind: NodeKind<T>,
}

enum NodeKind<T> {
    Leaf(T),
    Internal { left: u32, right: u32 },
}

/// Balanced static BVH; answers nearest-hit ray queries and frustum culling.
///
/// Immutable once built. Querying an empty tree is a normal no-hit, not an
/// error.
pub struct AabbTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<u32>,
}

impl<T> AabbTree<T> {
    /// An empty tree; every query misses
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Bulk-build over `(bounds, payload)` primitives.
    ///
    /// Key mapping and the sort fan out across rayon; the build itself is a
    /// single synchronous call to the caller.
    pub fn build(items: Vec<(Aabb, T)>) -> Self
    where
        T: Send,
    {
        if items.is_empty() {
            return Self::new();
        }

        let coder = MortonCoder::new(WORLD_BOUNDS);
        let mut keyed: Vec<(u32, Aabb, T)> = items
            .into_par_iter()
            .map(|(bounds, item)| (coder.encode_point(bounds.center()), bounds, item))
            .collect();
        keyed.par_sort_unstable_by_key(|(key, _, _)| *key);

        let count = keyed.len();
        let mut nodes = Vec::with_capacity(2 * count - 1);
        let mut items = keyed.into_iter().map(|(_, bounds, item)| (bounds, item));
        let root = Self::build_range(&mut nodes, &mut items, count);
        Self {
            nodes,
            root: Some(root),
        }
    }

    /// Build the subtree for the next `count` sorted leaves, depth-first so
    /// the leaf iterator is consumed in order. Returns the subtree root.
    fn build_range(
        nodes: &mut Vec<Node<T>>,
        items: &mut impl Iterator<Item = (Aabb, T)>,
        count: usize,
    ) -> u32 {
        if count == 1 {
            let (bounds, item) = items.next().expect("leaf count matches item count");
            nodes.push(Node {
                bounds,
                kind: NodeKind::Leaf(item),
            });
            return (nodes.len() - 1) as u32;
        }

        let left = Self::build_range(nodes, items, count / 2);
        let right = Self::build_range(nodes, items, count - count / 2);
        let bounds = nodes[left as usize]
            .bounds
            .union(&nodes[right as usize].bounds);
        nodes.push(Node {
            bounds,
            kind: NodeKind::Internal { left, right },
        });
        (nodes.len() - 1) as u32
    }

    /// Number of primitives in the tree
    pub fn len(&self) -> usize {
        if self.root.is_none() {
            0
        } else {
            (self.nodes.len() + 1) / 2
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of everything in the tree; `None` when empty
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.map(|r| self.nodes[r as usize].bounds)
    }

    /// Nearest hit along `ray`.
    ///
    /// `test` performs the primitive-level intersection and returns the ray
    /// parameter plus a hit payload. Subtrees whose boxes the ray misses are
    /// pruned, the nearer child is visited first, and a subtree is skipped
    /// once its box entry distance exceeds the best confirmed hit.
    pub fn pick<H, F>(&self, ray: &Ray, mut test: F) -> Option<(f32, H)>
    where
        F: FnMut(&T) -> Option<(f32, H)>,
    {
        let root = self.root?;
        let (entry, _) = ray.intersects_aabb(&self.nodes[root as usize].bounds)?;
        let mut best = None;
        self.pick_node(root, ray, entry, &mut test, &mut best);
        best
    }

    fn pick_node<H, F>(
        &self,
        index: u32,
        ray: &Ray,
        entry: f32,
        test: &mut F,
        best: &mut Option<(f32, H)>,
    ) where
        F: FnMut(&T) -> Option<(f32, H)>,
    {
        if let Some((best_t, _)) = best {
            if entry > *best_t {
                return;
            }
        }
        match &self.nodes[index as usize].kind {
            NodeKind::Leaf(item) => {
                if let Some((t, hit)) = test(item) {
                    if best.as_ref().is_none_or(|(best_t, _)| t < *best_t) {
                        *best = Some((t, hit));
                    }
                }
            }
            NodeKind::Internal { left, right } => {
                let hit = |child: u32| {
                    ray.intersects_aabb(&self.nodes[child as usize].bounds)
                        .map(|(t, _)| t)
                };
                match (hit(*left), hit(*right)) {
                    (Some(lt), Some(rt)) => {
                        let (near, near_t, far, far_t) = if lt <= rt {
                            (*left, lt, *right, rt)
                        } else {
                            (*right, rt, *left, lt)
                        };
                        self.pick_node(near, ray, near_t, test, best);
                        self.pick_node(far, ray, far_t, test, best);
                    }
                    (Some(lt), None) => self.pick_node(*left, ray, lt, test, best),
                    (None, Some(rt)) => self.pick_node(*right, ray, rt, test, best),
                    (None, None) => {}
                }
            }
        }
    }

    /// All payloads whose leaf boxes intersect the frustum, pruning whole
    /// subtrees by their node boxes
    pub fn collect_visible(&self, frustum: &Frustum) -> Vec<&T> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.visible_node(root, frustum, &mut out);
        }
        out
    }

    fn visible_node<'a>(&'a self, index: u32, frustum: &Frustum, out: &mut Vec<&'a T>) {
        let node = &self.nodes[index as usize];
        if !frustum.intersects_aabb(&node.bounds) {
            return;
        }
        match &node.kind {
            NodeKind::Leaf(item) => out.push(item),
            NodeKind::Internal { left, right } => {
                self.visible_node(*left, frustum, out);
                self.visible_node(*right, frustum, out);
            }
        }
    }

    /// Depth of the deepest leaf; the midpoint split keeps this at
    /// ceil(log2 N) + 1 levels
    pub fn depth(&self) -> usize {
        fn node_depth<T>(nodes: &[Node<T>], index: u32) -> usize {
            match &nodes[index as usize].kind {
                NodeKind::Leaf(_) => 1,
                NodeKind::Internal { left, right } => {
                    1 + node_depth(nodes, *left).max(node_depth(nodes, *right))
                }
            }
        }
        self.root.map_or(0, |r| node_depth(&self.nodes, r))
    }

    /// Check the structural invariant: every internal box is the tight union
    /// of its children's boxes
    pub fn validate(&self) -> bool {
        fn check<T>(nodes: &[Node<T>], index: u32) -> bool {
            let node = &nodes[index as usize];
            match &node.kind {
                NodeKind::Leaf(_) => true,
                NodeKind::Internal { left, right } => {
                    let union = nodes[*left as usize]
                        .bounds
                        .union(&nodes[*right as usize].bounds);
                    node.bounds == union && check(nodes, *left) && check(nodes, *right)
                }
            }
        }
        self.root.is_none_or(|r| check(&self.nodes, r))
    }
}

impl<T> Default for AabbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;
    use rand::prelude::*;

    fn unit_box_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::new(Vec3::new(x, y, z), Vec3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    /// Narrow test for box primitives: the analytic slab entry distance
    fn box_test<'a>(
        ray: &'a Ray,
        boxes: &'a [(Aabb, usize)],
    ) -> impl FnMut(&usize) -> Option<(f32, usize)> + 'a {
        move |&i| {
            ray.intersects_aabb(&boxes[i].0)
                .map(|(t_near, _)| (t_near, i))
        }
    }

    #[test]
    fn test_empty_tree_misses() {
        let tree: AabbTree<usize> = AabbTree::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(tree.pick(&ray, |_| -> Option<(f32, usize)> { None }).is_none());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn test_single_leaf() {
        let tree = AabbTree::build(vec![(unit_box_at(2.0, 0.0, 0.0), 7usize)]);
        assert_eq!(tree.len(), 1);
        assert!(tree.validate());
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.5), Vec3::X);
        let (t, id) = tree
            .pick(&ray, |&i| {
                ray.intersects_aabb(&unit_box_at(2.0, 0.0, 0.0))
                    .map(|(t, _)| (t, i))
            })
            .unwrap();
        assert_eq!(id, 7);
        assert!((t - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_exact_hit_among_disjoint_boxes() {
        // A row of disjoint boxes; the ray is aimed to pass through exactly one
        let boxes: Vec<(Aabb, usize)> = (0..16)
            .map(|i| (unit_box_at(i as f32 * 4.0, i as f32 * 4.0, 0.0), i))
            .collect();
        let tree = AabbTree::build(boxes.clone());
        assert!(tree.validate());

        for (bounds, id) in &boxes {
            let target = bounds.center();
            let ray = Ray::new(Vec3::new(target.x, target.y, 10.0), Vec3::NEG_Z);
            let (t, hit) = tree.pick(&ray, box_test(&ray, &boxes)).unwrap();
            assert_eq!(hit, *id);
            // Analytic slab entry: box top sits at z = 1
            assert!((t - 9.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_nearest_of_stacked_boxes() {
        let boxes: Vec<(Aabb, usize)> = (0..8)
            .map(|i| (unit_box_at(0.0, 0.0, i as f32 * 3.0), i))
            .collect();
        let tree = AabbTree::build(boxes.clone());
        // From above, the highest box must win
        let ray = Ray::new(Vec3::new(0.5, 0.5, 100.0), Vec3::NEG_Z);
        let (_, hit) = tree.pick(&ray, box_test(&ray, &boxes)).unwrap();
        assert_eq!(hit, 7);
        // From below, the lowest
        let ray = Ray::new(Vec3::new(0.5, 0.5, -100.0), Vec3::Z);
        let (_, hit) = tree.pick(&ray, box_test(&ray, &boxes)).unwrap();
        assert_eq!(hit, 0);
    }

    #[test]
    fn test_build_64k_and_agree_with_linear_scan() {
        let mut rng = StdRng::seed_from_u64(1);
        let boxes: Vec<(Aabb, usize)> = (0..64_000)
            .map(|i| {
                let p = Vec3::new(
                    rng.random_range(-4096..4096) as f32,
                    rng.random_range(-4096..4096) as f32,
                    rng.random_range(-4096..4096) as f32,
                );
                (Aabb::new(p, p + Vec3::ONE), i)
            })
            .collect();
        let tree = AabbTree::build(boxes.clone());
        assert_eq!(tree.len(), 64_000);
        assert!(tree.validate());
        // Balanced by construction: ceil(log2 64000) + 1
        assert!(tree.depth() <= 17);

        for _ in 0..32 {
            let origin = Vec3::new(
                rng.random_range(-6000..6000) as f32,
                rng.random_range(-6000..6000) as f32,
                rng.random_range(-6000..6000) as f32,
            );
            let target = Vec3::new(
                rng.random_range(-4096..4096) as f32,
                rng.random_range(-4096..4096) as f32,
                rng.random_range(-4096..4096) as f32,
            );
            let ray = Ray::new(origin, (target - origin).normalize());

            let tree_hit = tree.pick(&ray, box_test(&ray, &boxes));
            let brute = boxes
                .iter()
                .filter_map(|(b, i)| ray.intersects_aabb(b).map(|(t, _)| (t, *i)))
                .min_by(|a, b| a.0.total_cmp(&b.0));

            match (tree_hit, brute) {
                (None, None) => {}
                (Some((t, i)), Some((bt, bi))) => {
                    assert_eq!(i, bi, "tree and linear scan disagree on the primitive");
                    assert!((t - bt).abs() < 0.001);
                }
                (tree_hit, brute) => {
                    panic!("tree {tree_hit:?} vs linear scan {brute:?}");
                }
            }
        }
    }

    #[test]
    fn test_collect_visible_prunes() {
        use crate::core::types::Mat4;
        let boxes = vec![
            (unit_box_at(-0.5, -0.5, -0.5), 0usize),
            (unit_box_at(50.0, 0.0, 0.0), 1usize),
        ];
        let tree = AabbTree::build(boxes);
        let proj = Mat4::orthographic_rh(-2.0, 2.0, -2.0, 2.0, 0.1, 20.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let frustum = Frustum::from_view_projection(&(proj * view));
        let visible = tree.collect_visible(&frustum);
        assert_eq!(visible, vec![&0usize]);
    }
}
