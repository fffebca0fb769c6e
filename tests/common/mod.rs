#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use toaststack::{
    EventLoop, EventSink, Host, HostEvent, HostId, ManualLoop, Motion, MotionKind, Point, Size,
    Surface, SurfaceSpec, ToastId,
};

pub const PARENT: Size = Size::new(900, 700);

/// Parent surface that records what the engine asks of it.
pub struct FakeHost {
    id: HostId,
    size: Cell<Size>,
    pub event_loop: Rc<ManualLoop>,
    sinks: RefCell<Vec<EventSink>>,
    surfaces: RefCell<Vec<Rc<FakeSurface>>>,
    next_height: Cell<i32>,
}

pub struct FakeSurface {
    pub id: ToastId,
    pub width: i32,
    pub height: Cell<i32>,
    pub pos: Cell<Point>,
    pub motions: RefCell<Vec<Motion>>,
    pub destroyed: Cell<bool>,
    pub had_custom: bool,
    pub message: String,
}

impl FakeSurface {
    pub fn motions_of(&self, kind: MotionKind) -> Vec<Motion> {
        self.motions
            .borrow()
            .iter()
            .filter(|m| m.kind == kind)
            .copied()
            .collect()
    }
}

struct SurfaceRef(Rc<FakeSurface>);

impl Surface for SurfaceRef {
    fn size(&self) -> Size {
        Size::new(self.0.width, self.0.height.get())
    }

    fn move_to(&self, at: Point) {
        self.0.pos.set(at);
    }

    fn animate(&self, motion: &Motion) {
        self.0.motions.borrow_mut().push(*motion);
        self.0.pos.set(motion.to);
    }

    fn destroy(&self) {
        self.0.destroyed.set(true);
    }
}

impl FakeHost {
    pub fn new() -> Rc<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Rc::new(Self {
            id: HostId(NEXT.fetch_add(1, Ordering::Relaxed)),
            size: Cell::new(PARENT),
            event_loop: Rc::new(ManualLoop::new()),
            sinks: RefCell::new(Vec::new()),
            surfaces: RefCell::new(Vec::new()),
            next_height: Cell::new(60),
        })
    }

    pub fn as_host(self: &Rc<Self>) -> Rc<dyn Host> {
        self.clone()
    }

    pub fn set_next_height(&self, height: i32) {
        self.next_height.set(height);
    }

    pub fn advance(&self, ms: u64) {
        self.event_loop.advance_ms(ms);
    }

    pub fn emit(&self, event: HostEvent) {
        let sinks: Vec<EventSink> = self.sinks.borrow().clone();
        for sink in sinks {
            sink(event);
        }
    }

    pub fn resize(&self, size: Size) {
        self.size.set(size);
        self.emit(HostEvent::Resized);
    }

    pub fn surface(&self, id: ToastId) -> Rc<FakeSurface> {
        self.surfaces
            .borrow()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .expect("surface was created")
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.borrow().len()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.borrow().len()
    }
}

impl Host for FakeHost {
    fn id(&self) -> HostId {
        self.id
    }

    fn size(&self) -> Size {
        self.size.get()
    }

    fn event_loop(&self) -> Rc<dyn EventLoop> {
        self.event_loop.clone()
    }

    fn connect_events(&self, sink: EventSink) {
        self.sinks.borrow_mut().push(sink);
    }

    fn create_surface(&self, spec: &SurfaceSpec<'_>) -> Box<dyn Surface> {
        let surface = Rc::new(FakeSurface {
            id: spec.id,
            width: spec.width,
            height: Cell::new(self.next_height.get()),
            pos: Cell::new(Point::default()),
            motions: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
            had_custom: spec.custom.is_some(),
            message: spec.message.to_string(),
        });
        self.surfaces.borrow_mut().push(surface.clone());
        Box::new(SurfaceRef(surface))
    }
}
