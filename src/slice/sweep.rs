//! The sweep driver.
//!
//! A [`Sweep`] owns all mutable slicing state for one mesh: the vertex event
//! queue, the towers not yet consumed, the active ring set and the layers
//! emitted so far. Vertices are processed in ascending `(height, id)` order;
//! each event retires the edges ending at the vertex, splices in the
//! vertex's own fragments and re-closes the ring set. Between events, every
//! output height lying strictly below the next event is emitted.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use std::time::Instant;

use log::{debug, info, trace, warn};
use ordered_float::OrderedFloat;

use super::layer::{emit_layer, Layer};
use super::progress::{Progress, ProgressEvent};
use super::token::{join_fragments, Fragment};
use super::tower::{build_towers, VertexTower};
use super::SliceOptions;
use crate::error::{PartialSlice, Result, SliceError};
use crate::mesh::{EdgeId, EdgeTable, TriangleMesh, VertexId};

/// A pending vertex event, ordered by height and then by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Event {
    height: OrderedFloat<f64>,
    vertex: VertexId,
}

/// The active rings, indexed by the edges they cross.
///
/// Rings are kept in insertion order so that layer output is deterministic.
#[derive(Debug, Default)]
struct RingSet {
    rings: BTreeMap<u64, Fragment>,
    owner: HashMap<EdgeId, u64>,
    next_key: u64,
}

impl RingSet {
    fn insert(&mut self, ring: Fragment) {
        let key = self.next_key;
        self.next_key += 1;
        for e in ring.edges() {
            self.owner.insert(e, key);
        }
        self.rings.insert(key, ring);
    }

    /// Remove and return every ring crossing one of `edges`, oldest first.
    fn take_owning(&mut self, edges: &[EdgeId]) -> Vec<Fragment> {
        let mut keys: Vec<u64> = edges.iter().filter_map(|e| self.owner.get(e).copied()).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut taken = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(ring) = self.rings.remove(&key) {
                for e in ring.edges() {
                    self.owner.remove(&e);
                }
                taken.push(ring);
            }
        }
        taken
    }

    fn len(&self) -> usize {
        self.rings.len()
    }

    fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &Fragment> + '_ {
        self.rings.values()
    }
}

/// Incremental cross-section sweep over one mesh.
///
/// # Example
/// ```
/// use sliver::mesh::primitives;
/// use sliver::slice::{SliceOptions, Sweep};
///
/// let mesh = primitives::tetrahedron();
/// let mut sweep = Sweep::new(&mesh, &SliceOptions::new(0.5)).unwrap();
/// while sweep.step().unwrap() {}
///
/// assert_eq!(sweep.layers().len(), 2);
/// assert_eq!(sweep.ring_count(), 0);
/// ```
#[derive(Debug)]
pub struct Sweep<'m> {
    mesh: &'m TriangleMesh,
    edges: EdgeTable,
    options: SliceOptions,
    queue: BinaryHeap<Reverse<Event>>,
    total_events: usize,
    towers: Vec<Option<VertexTower>>,
    rings: RingSet,
    base_height: f64,
    next_layer: usize,
    processed: usize,
    layers: Vec<Layer>,
}

impl<'m> Sweep<'m> {
    /// Validate the input and prepare the sweep.
    ///
    /// This checks the options and the triangle budget, derives the edge
    /// table (rejecting non-manifold input), builds the towers and seeds the
    /// event queue.
    pub fn new(mesh: &'m TriangleMesh, options: &SliceOptions) -> Result<Self> {
        options.validate()?;

        if let Some(limit) = options.max_triangles {
            if mesh.num_faces() > limit {
                return Err(SliceError::TooManyTriangles {
                    faces: mesh.num_faces(),
                    limit,
                });
            }
        }
        if mesh.num_faces() == 0 {
            return Err(SliceError::EmptyMesh);
        }

        let axis = options.axis;
        let (base_height, top_height) = mesh.height_range(axis).ok_or(SliceError::EmptyMesh)?;

        let edges = EdgeTable::build(mesh, axis)?;
        let towers = build_towers(mesh, &edges, options.parallel);
        debug!(
            "built {} towers with {} fragments over {} edges",
            towers.len(),
            towers.iter().map(|t| t.fragments().len()).sum::<usize>(),
            edges.len()
        );

        let queue: BinaryHeap<_> = mesh
            .referenced_vertices()
            .into_iter()
            .map(|vertex| {
                Reverse(Event {
                    height: OrderedFloat(mesh.height(vertex, axis)),
                    vertex,
                })
            })
            .collect();
        let total_events = queue.len();

        info!(
            "slicing {} faces along {:?} from {} to {} at layer height {}",
            mesh.num_faces(),
            axis,
            base_height,
            top_height,
            options.layer_height
        );

        Ok(Self {
            mesh,
            edges,
            options: options.clone(),
            queue,
            total_events,
            towers: towers.into_iter().map(Some).collect(),
            rings: RingSet::default(),
            base_height,
            next_layer: 0,
            processed: 0,
            layers: Vec::new(),
        })
    }

    /// Height of the `k`-th output layer.
    ///
    /// Layers sit at the middle of each `layer_height` band above the lowest
    /// vertex.
    #[inline]
    pub fn layer_height_at(&self, k: usize) -> f64 {
        self.base_height + (k as f64 + 0.5) * self.options.layer_height
    }

    /// Lower bound of the `k`-th layer band; the band's top is the bottom of
    /// band `k + 1`.
    #[inline]
    pub fn layer_bottom_at(&self, k: usize) -> f64 {
        self.base_height + k as f64 * self.options.layer_height
    }

    /// The derived edge table.
    pub fn edges(&self) -> &EdgeTable {
        &self.edges
    }

    /// Number of active rings.
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// The active rings, oldest first.
    pub fn rings(&self) -> impl Iterator<Item = &Fragment> + '_ {
        self.rings.iter()
    }

    /// Layers emitted so far.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of vertex events processed.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Whether every vertex event has been processed.
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Consume the sweep, returning the emitted layers.
    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }

    /// Process the next vertex event and emit any layers it unblocks.
    ///
    /// Returns `Ok(false)` once the queue is empty.
    pub fn step(&mut self) -> Result<bool> {
        self.advance(&Progress::none())
    }

    /// Run the sweep to completion.
    ///
    /// On failure the layers emitted before the error are returned with it.
    pub fn run(mut self, progress: &Progress) -> std::result::Result<Vec<Layer>, PartialSlice> {
        progress.report(ProgressEvent::TowersBuilt {
            towers: self.towers.len(),
        });

        let started = Instant::now();
        loop {
            if let Some(budget) = self.options.time_budget {
                if self.processed > 0 && started.elapsed() >= budget {
                    let error = SliceError::BudgetExceeded {
                        budget,
                        processed: self.processed,
                    };
                    return Err(PartialSlice {
                        layers: self.layers,
                        error,
                    });
                }
            }

            match self.advance(progress) {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => {
                    return Err(PartialSlice {
                        layers: self.layers,
                        error,
                    })
                }
            }
        }

        if self.layers.is_empty() {
            warn!("mesh is thinner than one layer; no layers emitted");
        }
        info!(
            "sliced {} vertices into {} layers in {:?}",
            self.processed,
            self.layers.len(),
            started.elapsed()
        );
        Ok(self.layers)
    }

    fn advance(&mut self, progress: &Progress) -> Result<bool> {
        let Some(Reverse(event)) = self.queue.pop() else {
            return Ok(false);
        };

        self.process(event)?;
        self.processed += 1;
        progress.report(ProgressEvent::VertexProcessed {
            processed: self.processed,
            total: self.total_events,
            height: event.height.0,
        });

        match self.queue.peek() {
            Some(Reverse(next)) => {
                let next_height = next.height.0;
                self.emit_below(next_height, progress)?;
            }
            None if !self.rings.is_empty() => {
                return Err(SliceError::LeftoverRings {
                    count: self.rings.len(),
                });
            }
            None => {}
        }
        Ok(true)
    }

    fn process(&mut self, event: Event) -> Result<()> {
        let (fragments, incoming) = match self.towers[event.vertex.index()].take() {
            Some(tower) => tower.into_parts(),
            None => (Vec::new(), Vec::new()),
        };

        let retired: HashSet<EdgeId> = incoming.iter().copied().collect();
        let split = self.rings.take_owning(&incoming);
        let split_count = split.len();

        let mut pool: Vec<Fragment> = Vec::with_capacity(split.len() * 2 + fragments.len());
        for ring in &split {
            pool.extend(ring.split_where(|e| retired.contains(&e)));
        }
        pool.extend(fragments);

        let mut closed = 0;
        for piece in join_fragments(pool) {
            if !piece.is_closed() {
                return Err(SliceError::UnresolvedFragment {
                    vertex: event.vertex,
                    height: event.height.0,
                    chain: piece.to_string(),
                });
            }
            let ring = piece.to_ring().ok_or_else(|| SliceError::RingClosure {
                vertex: event.vertex,
                height: event.height.0,
                chain: piece.to_string(),
            })?;
            self.rings.insert(ring);
            closed += 1;
        }

        trace!(
            "{} at {}: retired {} edges, split {} rings, {} rings out, {} active",
            event.vertex,
            event.height.0,
            incoming.len(),
            split_count,
            closed,
            self.rings.len()
        );
        Ok(())
    }

    /// Emit every pending layer strictly below `limit`.
    fn emit_below(&mut self, limit: f64, progress: &Progress) -> Result<()> {
        loop {
            let height = self.layer_height_at(self.next_layer);
            if height >= limit {
                return Ok(());
            }

            let (bottom, top) = (
                self.layer_bottom_at(self.next_layer),
                self.layer_bottom_at(self.next_layer + 1),
            );
            let rings: Vec<&Fragment> = self.rings.iter().collect();
            let layer = emit_layer(
                self.mesh,
                &self.edges,
                &rings,
                self.next_layer,
                height,
                self.options.parallel,
                self.options.collinear_tolerance,
            )?
            .with_band(bottom, top);

            debug!(
                "layer {} at {}: {} polygons, {} points",
                layer.index,
                layer.height,
                layer.polygon_count(),
                layer.point_count()
            );
            progress.report(ProgressEvent::LayerEmitted {
                index: layer.index,
                height: layer.height,
                polygons: layer.polygon_count(),
            });

            self.layers.push(layer);
            self.next_layer += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{primitives, Axis};
    use std::time::Duration;

    #[test]
    fn test_event_order_breaks_ties_by_id() {
        let a = Event {
            height: OrderedFloat(1.0),
            vertex: VertexId::new(3),
        };
        let b = Event {
            height: OrderedFloat(1.0),
            vertex: VertexId::new(7),
        };
        let c = Event {
            height: OrderedFloat(0.5),
            vertex: VertexId::new(9),
        };
        let mut heap: BinaryHeap<Reverse<Event>> = [b, a, c].into_iter().map(Reverse).collect();
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|Reverse(e)| e.vertex.index())).collect();
        assert_eq!(order, vec![9, 3, 7]);
    }

    #[test]
    fn test_active_edges_straddle_the_sweep() {
        let mesh = primitives::uv_sphere(1.0, 12, 6);
        let options = SliceOptions::new(0.1).sequential();
        let mut sweep = Sweep::new(&mesh, &options).unwrap();

        let mut done = vec![false; mesh.num_vertices()];
        while let Some(Reverse(next)) = sweep.queue.peek().copied() {
            assert!(sweep.step().unwrap());
            done[next.vertex.index()] = true;

            for ring in sweep.rings() {
                assert!(ring.is_ring());
                for e in ring.edges() {
                    let edge = sweep.edges().edge(e);
                    assert!(done[edge.low.index()]);
                    assert!(!done[edge.high.index()]);
                }
            }
        }
        assert!(!sweep.step().unwrap());
        assert!(sweep.is_finished());
        assert_eq!(sweep.ring_count(), 0);
        assert_eq!(sweep.processed(), mesh.num_vertices());
    }

    #[test]
    fn test_each_active_edge_appears_once() {
        let mesh = primitives::torus(2.0, 0.5, 16, 8);
        let options = SliceOptions::new(0.05).with_axis(Axis::Y).sequential();
        let mut sweep = Sweep::new(&mesh, &options).unwrap();

        while sweep.step().unwrap() {
            let mut seen = HashSet::new();
            for ring in sweep.rings() {
                for e in ring.cycle().iter().filter_map(|t| t.edge()) {
                    assert!(seen.insert(e), "edge {:?} in two places", e);
                }
            }
        }
    }

    #[test]
    fn test_layer_heights_are_mid_planes() {
        let mesh = primitives::unit_cube();
        let sweep = Sweep::new(&mesh, &SliceOptions::new(0.25)).unwrap();
        assert!((sweep.layer_height_at(0) - 0.125).abs() < 1e-12);
        assert!((sweep.layer_height_at(3) - 0.875).abs() < 1e-12);
        assert!((sweep.layer_bottom_at(1) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_unused_vertex_is_not_an_event() {
        let (mut vertices, faces) = crate::mesh::to_face_vertex(&primitives::tetrahedron());
        vertices.insert(0, nalgebra::Point3::new(0.0, 0.0, 9.0));
        let faces: Vec<[usize; 3]> = faces.iter().map(|f| f.map(|i| i + 1)).collect();
        let mesh = crate::mesh::build_from_triangles(&vertices, &faces).unwrap();

        let layers = Sweep::new(&mesh, &SliceOptions::new(0.5))
            .unwrap()
            .run(&Progress::none())
            .unwrap();
        assert_eq!(layers.len(), 2);
        assert!(layers.iter().all(|l| l.polygon_count() == 1));

        let mut sweep = Sweep::new(&mesh, &SliceOptions::new(0.5)).unwrap();
        while sweep.step().unwrap() {}
        assert_eq!(sweep.processed(), 4);
    }

    #[test]
    fn test_triangle_budget() {
        let mesh = primitives::uv_sphere(1.0, 8, 4);
        let options = SliceOptions::new(0.1).with_max_triangles(10);
        let err = Sweep::new(&mesh, &options).unwrap_err();
        assert!(matches!(err, SliceError::TooManyTriangles { limit: 10, .. }));
    }

    #[test]
    fn test_time_budget() {
        let mesh = primitives::uv_sphere(1.0, 16, 8);
        let options = SliceOptions::new(0.1).with_time_budget(Duration::ZERO);
        let partial = Sweep::new(&mesh, &options)
            .unwrap()
            .run(&Progress::none())
            .unwrap_err();
        assert!(matches!(
            partial.error,
            SliceError::BudgetExceeded { processed: 1, .. }
        ));
    }

    #[test]
    fn test_non_manifold_rejected_before_sweep() {
        let vertices = vec![
            nalgebra::Point3::new(0.0, 0.0, 0.0),
            nalgebra::Point3::new(1.0, 0.0, 0.0),
            nalgebra::Point3::new(0.0, 1.0, 1.0),
        ];
        let mesh = crate::mesh::build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let err = Sweep::new(&mesh, &SliceOptions::default()).unwrap_err();
        assert!(matches!(err, SliceError::NonManifoldEdge { .. }));
    }
}
