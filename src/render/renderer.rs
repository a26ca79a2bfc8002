use std::time::Duration;

use super::scene::Scene;
use super::transition::{Frame, TransitionPlan};
use crate::phylo::PhyloTree;

/// Signal bound to one render pass. Runs exactly once.
pub type Completion = Box<dyn FnOnce()>;

struct RenderPass {
    plan: TransitionPlan,
    started_at: f64,
    duration_secs: f64,
    on_complete: Option<Completion>,
}

impl RenderPass {
    fn progress(&self, now_secs: f64) -> f32 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        ((now_secs - self.started_at) / self.duration_secs).clamp(0.0, 1.0) as f32
    }

    fn complete(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        self.complete();
    }
}

/// Drives render passes: builds the target scene, plans the transition from
/// whatever is on screen, and samples frames until the pass settles.
#[derive(Default)]
pub struct Renderer {
    scene: Scene,
    frame: Frame,
    pass: Option<RenderPass>,
    passes: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a pass towards the current state of `tree`. A zero `duration`
    /// applies the final state and signals completion before returning. A
    /// pass still in flight is cut short at its current frame and its
    /// completion is signalled.
    pub fn render(
        &mut self,
        tree: &mut PhyloTree,
        duration: Duration,
        now_secs: f64,
        on_complete: Option<Completion>,
    ) -> &Scene {
        if let Some(mut interrupted) = self.pass.take() {
            self.frame = interrupted.plan.sample(interrupted.progress(now_secs));
            tracing::debug!(pass = self.passes, "render pass interrupted");
            interrupted.complete();
        }

        self.passes += 1;
        self.scene = Scene::build(tree);

        if duration.is_zero() {
            self.frame = TransitionPlan::settled(&self.scene).sample(1.0);
            tracing::debug!(
                pass = self.passes,
                nodes = self.scene.nodes.len(),
                "render pass applied"
            );
            if let Some(on_complete) = on_complete {
                on_complete();
            }
            return &self.scene;
        }

        let plan = TransitionPlan::between(&self.frame, &self.scene, tree);
        self.frame = plan.sample(0.0);
        self.pass = Some(RenderPass {
            plan,
            started_at: now_secs,
            duration_secs: duration.as_secs_f64(),
            on_complete,
        });
        &self.scene
    }

    /// Moves the running pass to `now_secs`. Returns whether a pass is still
    /// in flight afterwards.
    pub fn advance(&mut self, now_secs: f64) -> bool {
        let Some(pass) = &self.pass else {
            return false;
        };

        let progress = pass.progress(now_secs);
        self.frame = pass.plan.sample(progress);
        if progress < 1.0 {
            return true;
        }

        if let Some(mut finished) = self.pass.take() {
            tracing::debug!(
                pass = self.passes,
                nodes = self.scene.nodes.len(),
                "render pass settled"
            );
            finished.complete();
        }
        false
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Target of the latest pass. Canvas bounds come from here, not from the
    /// frame in flight.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_animating(&self) -> bool {
        self.pass.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::phylo::apply_initial_collapse;
    use crate::phylo::testing::{id, sample_hierarchy};

    const HALF_SECOND: Duration = Duration::from_millis(500);

    fn counter() -> (Rc<Cell<u32>>, Completion) {
        let count = Rc::new(Cell::new(0));
        let signal = Rc::clone(&count);
        (count, Box::new(move || signal.set(signal.get() + 1)))
    }

    fn collapsed_tree() -> PhyloTree {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        apply_initial_collapse(&mut tree);
        tree
    }

    #[test]
    fn zero_duration_completes_before_returning() {
        let mut tree = collapsed_tree();
        let mut renderer = Renderer::new();
        let (count, on_complete) = counter();

        renderer.render(&mut tree, Duration::ZERO, 0.0, Some(on_complete));
        assert_eq!(count.get(), 1);
        assert!(!renderer.is_animating());
        assert_eq!(renderer.frame().nodes.len(), renderer.scene().nodes.len());
    }

    #[test]
    fn completion_waits_for_the_whole_pass() {
        let mut tree = collapsed_tree();
        let mut renderer = Renderer::new();
        renderer.render(&mut tree, Duration::ZERO, 0.0, None);

        tree.expand(id(&tree, "L0a"));
        let (count, on_complete) = counter();
        renderer.render(&mut tree, HALF_SECOND, 10.0, Some(on_complete));

        assert!(renderer.advance(10.25));
        assert_eq!(count.get(), 0);
        assert!(!renderer.advance(10.5));
        assert_eq!(count.get(), 1);
        assert!(!renderer.advance(11.0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn interrupted_pass_still_completes_once() {
        let mut tree = collapsed_tree();
        let mut renderer = Renderer::new();
        renderer.render(&mut tree, Duration::ZERO, 0.0, None);

        let l0a = id(&tree, "L0a");
        tree.expand(l0a);
        let (first, on_first) = counter();
        renderer.render(&mut tree, HALF_SECOND, 1.0, Some(on_first));

        tree.collapse(l0a);
        let (second, on_second) = counter();
        renderer.render(&mut tree, HALF_SECOND, 1.2, Some(on_second));
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);

        renderer.advance(2.0);
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn interrupted_pass_restarts_from_the_current_frame() {
        let mut tree = collapsed_tree();
        let mut renderer = Renderer::new();
        renderer.render(&mut tree, Duration::ZERO, 0.0, None);

        let l0a = id(&tree, "L0a");
        let l0a1 = id(&tree, "L0a1");
        tree.expand(l0a);
        renderer.render(&mut tree, HALF_SECOND, 0.0, None);
        renderer.advance(0.25);
        let midway = renderer.frame().node_position(l0a1).expect("entering node");

        tree.collapse(l0a);
        renderer.render(&mut tree, HALF_SECOND, 0.25, None);
        assert_eq!(renderer.frame().node_position(l0a1), Some(midway));
    }

    #[test]
    fn dropping_the_renderer_signals_a_pending_pass() {
        let mut tree = collapsed_tree();
        let mut renderer = Renderer::new();
        let (count, on_complete) = counter();
        renderer.render(&mut tree, HALF_SECOND, 0.0, Some(on_complete));
        assert_eq!(count.get(), 0);

        drop(renderer);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn bounds_are_final_while_animating() {
        let mut tree = collapsed_tree();
        let mut renderer = Renderer::new();
        renderer.render(&mut tree, Duration::ZERO, 0.0, None);
        let before = renderer.scene().bounds;

        tree.expand_all_descendants(tree.root());
        renderer.render(&mut tree, HALF_SECOND, 0.0, None);
        assert!(renderer.is_animating());
        assert!(renderer.scene().bounds.height > before.height);
        assert!(renderer.scene().bounds.width > before.width);
    }
}
