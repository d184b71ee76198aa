//! Interactive crop session.
//!
//! [`CropSession`] owns the whole crop state for one image: the viewport, the
//! resize engine, the rotation dial and the two debounce timers. The host
//! feeds it [`GestureEvent`]s and a clock, and receives [`RenderSnapshot`]s
//! through a [`RenderSink`] and [`CropInfo`] updates through value-changed
//! subscribers.
//!
//! Everything here runs on the interaction thread. The only piece meant to
//! leave it is the [`ExtractionJob`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

use crate::aspect::CropAspectRatio;
use crate::bitmap::{Bitmap, BitmapProvider};
use crate::crop_info::CropInfo;
use crate::debounce::Debouncer;
use crate::error::ExtractError;
use crate::geometry::{EdgeInsets, Point, Rect, Size};
use crate::options::CropOptions;
use crate::resize::{fit_ratio, ResizeEngine};
use crate::rotation::RotationDial;
use crate::transform::{extract_from, InterpolationFilter};
use crate::viewport::Viewport;

/// Input delivered by the host's gesture recognizers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// A one-finger drag started at a viewport point.
    DragBegan(Point),
    /// Cumulative translation since the drag began.
    DragChanged(Point),
    DragEnded,
    /// Incremental scroll of the image by a finger movement.
    PanChanged(Point),
    /// Incremental pinch: `scale` relative to the previous step.
    PinchChanged { scale: f64, anchor: Point },
    PinchEnded,
    RotationBegan,
    /// Cumulative horizontal translation on the rotation dial.
    RotationChanged { translation_x: f64, dial_width: f64 },
    RotationEnded,
    /// The viewport was resized or the crop area moved.
    LayoutChanged { viewport: Size, max_crop_frame: Rect },
}

/// Supplies gesture events, oldest first.
pub trait GestureSource {
    fn next_event(&mut self) -> Option<GestureEvent>;
}

impl GestureSource for VecDeque<GestureEvent> {
    fn next_event(&mut self) -> Option<GestureEvent> {
        self.pop_front()
    }
}

/// Everything the view layer needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSnapshot {
    pub crop_rect: Rect,
    pub zoom: f64,
    pub offset: Point,
    pub rotation_angle: f64,
    pub content_inset: EdgeInsets,
    /// Whether the blur overlay outside the crop should be shown.
    pub blur_enabled: bool,
    /// Whether the change should be animated.
    pub animated: bool,
}

impl RenderSnapshot {
    /// Equality of the drawn state, ignoring how the change is presented.
    fn same_state(&self, other: &RenderSnapshot) -> bool {
        RenderSnapshot {
            animated: other.animated,
            ..*self
        } == *other
    }
}

/// Receives render snapshots. Only called when the state actually changed.
pub trait RenderSink {
    fn render(&mut self, snapshot: &RenderSnapshot);
}

impl<F: FnMut(&RenderSnapshot)> RenderSink for F {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        self(snapshot)
    }
}

/// A self-contained extraction that may run on any thread.
#[derive(Clone)]
pub struct ExtractionJob {
    provider: Arc<dyn BitmapProvider + Send + Sync>,
    info: CropInfo,
    filter: InterpolationFilter,
    interaction_thread: ThreadId,
}

impl fmt::Debug for ExtractionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionJob")
            .field("info", &self.info)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl ExtractionJob {
    pub fn info(&self) -> &CropInfo {
        &self.info
    }

    pub fn filter(&self) -> InterpolationFilter {
        self.filter
    }

    /// Whether the calling thread is the one that created the session.
    pub fn on_interaction_thread(&self) -> bool {
        thread::current().id() == self.interaction_thread
    }

    pub fn run(&self) -> Result<Bitmap, ExtractError> {
        if self.on_interaction_thread() {
            tracing::warn!("crop extraction running on the interaction thread");
        }
        extract_from(self.provider.as_ref(), &self.info, self.filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActiveDrag {
    Resize,
    Pan { last_translation: Point },
}

type ValueSubscriber = Box<dyn FnMut(&CropInfo)>;

/// Owns and reconciles the crop state of one image.
pub struct CropSession {
    options: CropOptions,
    provider: Arc<dyn BitmapProvider + Send + Sync>,
    image_size: Size,
    viewport: Viewport,
    resize: ResizeEngine,
    dial: RotationDial,
    align_timer: Debouncer,
    blur_timer: Debouncer,
    aspect_ratio: Option<CropAspectRatio>,
    blur_enabled: bool,
    drag: Option<ActiveDrag>,
    sink: Option<Box<dyn RenderSink>>,
    last_snapshot: Option<RenderSnapshot>,
    value_subscribers: Vec<ValueSubscriber>,
    interaction_thread: ThreadId,
}

impl fmt::Debug for CropSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropSession")
            .field("image_size", &self.image_size)
            .field("viewport", &self.viewport)
            .field("resize", &self.resize)
            .field("dial", &self.dial)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("blur_enabled", &self.blur_enabled)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

impl CropSession {
    /// Starts a session showing the whole image fitted into the viewport.
    ///
    /// The calling thread becomes the interaction thread.
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnsupportedSource`] when the provider reports no usable
    /// image size.
    pub fn new<P>(
        provider: Arc<P>,
        viewport_size: Size,
        options: CropOptions,
    ) -> Result<Self, ExtractError>
    where
        P: BitmapProvider + Send + Sync + 'static,
    {
        let options = options.validated();
        let image_size = provider.image_size();
        if !image_size.is_valid() {
            return Err(ExtractError::UnsupportedSource);
        }

        let max_crop_frame = options.max_crop_frame(viewport_size);
        let viewport = Viewport::fitted(
            viewport_size,
            max_crop_frame,
            image_size,
            options.maximum_zoom,
        );
        let resize = ResizeEngine::new(
            viewport.crop_frame,
            max_crop_frame,
            options.min_side,
            options.touch_area,
        );

        Ok(Self {
            align_timer: Debouncer::new(options.align_delay),
            blur_timer: Debouncer::new(options.blur_delay),
            options,
            provider,
            image_size,
            viewport,
            resize,
            dial: RotationDial::new(),
            aspect_ratio: None,
            blur_enabled: true,
            drag: None,
            sink: None,
            last_snapshot: None,
            value_subscribers: Vec::new(),
            interaction_thread: thread::current().id(),
        })
    }

    pub fn options(&self) -> &CropOptions {
        &self.options
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resize_engine(&self) -> &ResizeEngine {
        &self.resize
    }

    pub fn aspect_ratio(&self) -> Option<CropAspectRatio> {
        self.aspect_ratio
    }

    pub fn blur_enabled(&self) -> bool {
        self.blur_enabled
    }

    /// True while an align pass is scheduled.
    pub fn align_pending(&self) -> bool {
        self.align_timer.is_pending()
    }

    pub fn crop_info(&self) -> CropInfo {
        self.viewport.crop_info()
    }

    pub fn is_cropped(&self) -> bool {
        self.crop_info().is_cropped()
    }

    /// Installs the render sink and sends it the current state.
    pub fn set_render_sink(&mut self, sink: impl RenderSink + 'static) {
        self.sink = Some(Box::new(sink));
        self.last_snapshot = None;
        self.render(false);
    }

    /// Registers a callback for crop changes made by the user.
    pub fn on_value_changed(&mut self, subscriber: impl FnMut(&CropInfo) + 'static) {
        self.value_subscribers.push(Box::new(subscriber));
    }

    /// Applies every event the source has queued.
    pub fn drive(&mut self, source: &mut impl GestureSource, now: Instant) -> usize {
        let mut handled = 0;
        while let Some(event) = source.next_event() {
            self.handle(event, now);
            handled += 1;
        }
        handled
    }

    /// Applies one gesture event.
    pub fn handle(&mut self, event: GestureEvent, now: Instant) {
        let before = self.crop_info();
        match event {
            GestureEvent::DragBegan(point) => {
                self.begin_interaction();
                self.sync_engine();
                let edges = self.resize.begin(point);
                self.drag = if !edges.is_empty() {
                    Some(ActiveDrag::Resize)
                } else if self.viewport.crop_frame.contains_point(point) {
                    Some(ActiveDrag::Pan {
                        last_translation: Point::ZERO,
                    })
                } else {
                    None
                };
            }
            GestureEvent::DragChanged(translation) => match self.drag {
                Some(ActiveDrag::Resize) => {
                    if let Some(frame) = self.resize.update(translation) {
                        self.viewport = self.viewport.with_crop_frame(frame);
                    }
                }
                Some(ActiveDrag::Pan { last_translation }) => {
                    let delta = Point::new(
                        translation.x - last_translation.x,
                        translation.y - last_translation.y,
                    );
                    if delta.is_finite() {
                        self.viewport = self.viewport.panned_by(delta);
                        self.drag = Some(ActiveDrag::Pan {
                            last_translation: translation,
                        });
                    }
                }
                None => {}
            },
            GestureEvent::DragEnded => {
                self.resize.end();
                self.drag = None;
                self.end_interaction(now);
            }
            GestureEvent::PanChanged(delta) => {
                self.blur_enabled = false;
                if delta.is_finite() {
                    self.viewport = self.viewport.panned_by(delta);
                }
                self.end_interaction(now);
            }
            GestureEvent::PinchChanged { scale, anchor } => {
                self.blur_enabled = false;
                if anchor.is_finite() {
                    self.viewport = self.viewport.zoomed(scale, anchor);
                }
                self.end_interaction(now);
            }
            GestureEvent::PinchEnded => self.end_interaction(now),
            GestureEvent::RotationBegan => {
                self.begin_interaction();
                self.dial.begin();
            }
            GestureEvent::RotationChanged {
                translation_x,
                dial_width,
            } => {
                if let Some(angle) = self.dial.drag_changed(translation_x, dial_width) {
                    self.viewport = self.viewport.with_rotation(angle);
                }
            }
            GestureEvent::RotationEnded => self.end_interaction(now),
            GestureEvent::LayoutChanged {
                viewport,
                max_crop_frame,
            } => {
                if viewport.is_valid() && max_crop_frame.size.is_valid() {
                    self.viewport = self.viewport.with_size(viewport, max_crop_frame);
                } else {
                    tracing::debug!(?viewport, ?max_crop_frame, "ignoring degenerate layout");
                }
            }
        }

        if !matches!(self.drag, Some(ActiveDrag::Resize)) {
            self.sync_engine();
        }
        let after = self.crop_info();
        if after != before && !matches!(event, GestureEvent::LayoutChanged { .. }) {
            self.notify_value_changed(&after);
        }
        self.render(false);
    }

    /// Fires the timers that are due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.align_timer.fire_if_due(now).is_some() {
            tracing::debug!("aligning crop to center");
            self.viewport = self.viewport.aligned_to_center();
            self.sync_engine();
            self.render(true);
        }
        if self.blur_timer.fire_if_due(now).is_some() {
            self.blur_enabled = true;
            self.render(true);
        }
    }

    /// Locks the crop to a ratio, or unlocks it with `None`.
    ///
    /// A locked crop is reshaped to the largest frame of that ratio and
    /// centered.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: Option<CropAspectRatio>, animated: bool) {
        let ratio = aspect_ratio.and_then(|choice| choice.resolve(self.image_size));
        if aspect_ratio.is_some() && ratio.is_none() {
            tracing::debug!(
                ?aspect_ratio,
                "aspect ratio could not be resolved; unlocking"
            );
        }
        self.aspect_ratio = aspect_ratio.filter(|_| ratio.is_some());
        self.resize.set_locked_ratio(ratio);

        if let Some(ratio) = ratio {
            let frame = fit_ratio(self.viewport.max_crop_frame, ratio);
            self.align_timer.cancel();
            self.viewport = self.viewport.with_crop_frame(frame).aligned_to_center();
            self.sync_engine();
        }
        self.render(animated);
    }

    /// Returns to the whole, unrotated image and drops the ratio lock.
    pub fn reset_cropping(&mut self, animated: bool) {
        self.aspect_ratio = None;
        self.resize.set_locked_ratio(None);
        self.dial.reset();
        self.align_timer.cancel();
        self.viewport = Viewport::fitted(
            self.viewport.size,
            self.viewport.max_crop_frame,
            self.image_size,
            self.options.maximum_zoom,
        );
        self.sync_engine();
        self.render(animated);
    }

    /// Shows a previously computed selection. Out-of-bounds crops are clamped
    /// to the image.
    pub fn set_initial_crop(&mut self, info: CropInfo, animated: bool) {
        let valid = info.crop_size.is_valid()
            && info.rotation_center.is_finite()
            && info.rotation_angle.is_finite();
        if !valid {
            tracing::debug!(?info, "ignoring invalid initial crop");
            return;
        }

        let requested = info.scaled_to(self.image_size);
        let mut info = requested.clamped();
        if info != requested {
            tracing::debug!(?requested, clamped = ?info, "initial crop clamped to image");
        }
        self.dial.set_angle(info.rotation_angle);
        info.rotation_angle = self.dial.angle();

        self.align_timer.cancel();
        self.viewport = self.viewport.applying(&info);
        self.sync_engine();
        self.render(animated);
    }

    /// Extracts the current selection on the calling thread.
    ///
    /// On failure the unchanged source is returned; `None` only when the
    /// provider has no pixels at all.
    pub fn create_cropped_image(&self) -> Option<Bitmap> {
        match self.extraction_job().run() {
            Ok(bitmap) => Some(bitmap),
            Err(err) => {
                tracing::warn!(%err, "crop extraction failed; returning source image");
                self.provider
                    .primary()
                    .cloned()
                    .or_else(|| self.provider.alternate())
            }
        }
    }

    /// Packages the current selection for extraction on a worker thread.
    pub fn extraction_job(&self) -> ExtractionJob {
        ExtractionJob {
            provider: Arc::clone(&self.provider),
            info: self.crop_info(),
            filter: self.options.export_filter,
            interaction_thread: self.interaction_thread,
        }
    }

    fn begin_interaction(&mut self) {
        self.align_timer.cancel();
        self.blur_timer.cancel();
        self.blur_enabled = false;
    }

    fn end_interaction(&mut self, now: Instant) {
        self.align_timer.reschedule(now);
        self.blur_timer.reschedule(now);
    }

    fn sync_engine(&mut self) {
        self.resize.set_bounding_frame(self.viewport.max_crop_frame);
        self.resize.set_frame(self.viewport.crop_frame);
    }

    fn notify_value_changed(&mut self, info: &CropInfo) {
        for subscriber in &mut self.value_subscribers {
            subscriber(info);
        }
    }

    fn snapshot(&self, animated: bool) -> RenderSnapshot {
        RenderSnapshot {
            crop_rect: self.viewport.crop_frame,
            zoom: self.viewport.zoom,
            offset: self.viewport.offset,
            rotation_angle: self.viewport.rotation_angle,
            content_inset: self.viewport.content_inset,
            blur_enabled: self.blur_enabled,
            animated,
        }
    }

    fn render(&mut self, animated: bool) {
        let snapshot = self.snapshot(animated);
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if self
            .last_snapshot
            .is_some_and(|last| last.same_state(&snapshot))
        {
            return;
        }
        sink.render(&snapshot);
        self.last_snapshot = Some(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::AspectRatio;
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_8;
    use std::io;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// A provider that knows the image size but holds no pixels.
    struct SizeOnly(Size);

    impl BitmapProvider for SizeOnly {
        fn primary(&self) -> Option<&Bitmap> {
            None
        }

        fn image_size(&self) -> Size {
            self.0
        }
    }

    /// 800x600 image in a viewport whose crop area is exactly 800x600.
    fn landscape_session() -> CropSession {
        CropSession::new(
            Arc::new(SizeOnly(Size::new(800.0, 600.0))),
            Size::new(832.0, 632.0),
            CropOptions::default(),
        )
        .unwrap()
    }

    fn counter(session: &mut CropSession) -> Rc<RefCell<Vec<CropInfo>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.on_value_changed(move |info| sink.borrow_mut().push(*info));
        seen
    }

    /// Log sink shared between a test and its subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn gradient(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    #[test]
    fn test_new_rejects_empty_source() {
        let result = CropSession::new(
            Arc::new(SizeOnly(Size::ZERO)),
            Size::new(400.0, 400.0),
            CropOptions::default(),
        );
        assert!(matches!(result, Err(ExtractError::UnsupportedSource)));
    }

    #[test]
    fn test_starts_uncropped() {
        let session = landscape_session();
        let info = session.crop_info();
        assert!(info.crop_size.approx_eq(Size::new(800.0, 600.0), 1e-9));
        assert!(!session.is_cropped());
        assert!(session.blur_enabled());
    }

    #[test]
    fn test_square_ratio_on_portrait_image() {
        let mut session = CropSession::new(
            Arc::new(SizeOnly(Size::new(1000.0, 2000.0))),
            Size::new(432.0, 832.0),
            CropOptions::default(),
        )
        .unwrap();
        session.set_aspect_ratio(Some(AspectRatio::R1x1.into()), false);

        let info = session.crop_info();
        assert!(info.crop_size.approx_eq(Size::new(1000.0, 1000.0), 1e-6));
        assert!(info.rotation_center.approx_eq(Point::new(500.0, 1000.0), 1e-6));
        assert!(session.is_cropped());
        assert_eq!(
            session.aspect_ratio(),
            Some(CropAspectRatio::Fixed(AspectRatio::R1x1))
        );
    }

    #[test]
    fn test_set_aspect_ratio_is_idempotent() {
        let mut session = landscape_session();
        session.set_aspect_ratio(Some(AspectRatio::R16x9.into()), false);
        let once = session.viewport().crop_frame;
        let info = session.crop_info();
        session.set_aspect_ratio(Some(AspectRatio::R16x9.into()), false);
        assert!(session.viewport().crop_frame.approx_eq(&once, 1e-9));
        assert!(session.crop_info().rotation_center.approx_eq(info.rotation_center, 1e-9));
    }

    #[test]
    fn test_degenerate_custom_ratio_unlocks() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut session = landscape_session();
            session.set_aspect_ratio(Some(AspectRatio::R1x1.into()), false);
            session.set_aspect_ratio(Some(AspectRatio::Custom(bad).into()), false);
            assert_eq!(session.aspect_ratio(), None, "ratio {bad}");
            assert_eq!(session.resize_engine().locked_ratio(), None, "ratio {bad}");
        }
    }

    #[test]
    fn test_original_ratio_resolves_from_image() {
        let mut session = landscape_session();
        session.set_aspect_ratio(Some(CropAspectRatio::Original), false);
        let size = session.crop_info().crop_size;
        assert!((size.width / size.height - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(session.resize_engine().locked_ratio(), Some(4.0 / 3.0));

        session.set_aspect_ratio(None, false);
        assert_eq!(session.resize_engine().locked_ratio(), None);
        assert_eq!(session.aspect_ratio(), None);
    }

    #[test]
    fn test_corner_drag_crops_and_notifies() {
        let mut session = landscape_session();
        let seen = counter(&mut session);
        let now = Instant::now();

        session.handle(GestureEvent::DragBegan(Point::new(16.0, 16.0)), now);
        session.handle(GestureEvent::DragChanged(Point::new(50.0, 30.0)), now);

        let rect = session.crop_info().crop_rect();
        assert!(rect.approx_eq(&Rect::new(50.0, 30.0, 750.0, 570.0), 1e-9));
        assert_eq!(seen.borrow().len(), 1);

        // Same translation again changes nothing.
        session.handle(GestureEvent::DragChanged(Point::new(50.0, 30.0)), now);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_align_after_quiet_period() {
        let mut session = landscape_session();
        let start = Instant::now();
        session.handle(GestureEvent::DragBegan(Point::new(16.0, 16.0)), start);
        session.handle(GestureEvent::DragChanged(Point::new(200.0, 100.0)), start);
        session.handle(GestureEvent::DragEnded, start);
        let before = session.crop_info();
        let frame = session.viewport().crop_frame;

        session.tick(start + Duration::from_millis(1000));
        assert_eq!(session.viewport().crop_frame, frame);

        session.tick(start + Duration::from_millis(1200));
        let aligned = session.viewport().crop_frame;
        assert!((aligned.center().x - 416.0).abs() < 1e-9);
        assert!((aligned.center().y - 316.0).abs() < 1e-9);
        let after = session.crop_info();
        assert!(after.crop_size.approx_eq(before.crop_size, 1e-6));
        assert!(after.rotation_center.approx_eq(before.rotation_center, 1e-6));
    }

    #[test]
    fn test_new_gesture_cancels_pending_align() {
        let mut session = landscape_session();
        let start = Instant::now();
        session.handle(GestureEvent::DragBegan(Point::new(16.0, 16.0)), start);
        session.handle(GestureEvent::DragChanged(Point::new(200.0, 100.0)), start);
        session.handle(GestureEvent::DragEnded, start);
        assert!(session.align_pending());

        session.handle(
            GestureEvent::RotationBegan,
            start + Duration::from_millis(500),
        );
        assert!(!session.align_pending());
        let frame = session.viewport().crop_frame;
        session.tick(start + Duration::from_secs(5));
        assert_eq!(session.viewport().crop_frame, frame);
    }

    #[test]
    fn test_blur_disabled_during_gesture() {
        let mut session = landscape_session();
        let start = Instant::now();
        session.handle(GestureEvent::RotationBegan, start);
        assert!(!session.blur_enabled());
        session.handle(GestureEvent::RotationEnded, start);
        session.tick(start + Duration::from_millis(299));
        assert!(!session.blur_enabled());
        session.tick(start + Duration::from_millis(300));
        assert!(session.blur_enabled());
    }

    #[test]
    fn test_drag_inside_crop_pans() {
        let mut session = landscape_session();
        session.set_aspect_ratio(Some(AspectRatio::R1x1.into()), false);
        let seen = counter(&mut session);
        let now = Instant::now();

        session.handle(GestureEvent::DragBegan(Point::new(416.0, 316.0)), now);
        session.handle(GestureEvent::DragChanged(Point::new(-10.0, 0.0)), now);
        session.handle(GestureEvent::DragChanged(Point::new(-20.0, 0.0)), now);

        let info = session.crop_info();
        assert!((info.rotation_center.x - 420.0).abs() < 1e-9);
        assert!(info.crop_size.approx_eq(Size::new(600.0, 600.0), 1e-9));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_drag_outside_everything_is_ignored() {
        let mut session = landscape_session();
        session.set_aspect_ratio(Some(AspectRatio::R1x1.into()), false);
        let before = session.crop_info();
        let now = Instant::now();
        session.handle(GestureEvent::DragBegan(Point::new(40.0, 300.0)), now);
        session.handle(GestureEvent::DragChanged(Point::new(100.0, 0.0)), now);
        assert_eq!(session.crop_info(), before);
    }

    #[test]
    fn test_rotation_gesture() {
        let mut session = landscape_session();
        let seen = counter(&mut session);
        let now = Instant::now();
        session.handle(GestureEvent::RotationBegan, now);
        session.handle(
            GestureEvent::RotationChanged {
                translation_x: -75.0,
                dial_width: 300.0,
            },
            now,
        );
        let info = session.crop_info();
        assert!((info.rotation_angle - FRAC_PI_8).abs() < 1e-12);
        assert!(session.is_cropped());
        assert!(session.viewport().zoom >= session.viewport().minimum_zoom);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_pinch_zooms_in() {
        let mut session = landscape_session();
        let now = Instant::now();
        session.handle(
            GestureEvent::PinchChanged {
                scale: 2.0,
                anchor: Point::new(416.0, 316.0),
            },
            now,
        );
        let info = session.crop_info();
        assert!(info.crop_size.approx_eq(Size::new(400.0, 300.0), 1e-9));
        assert!(info.rotation_center.approx_eq(Point::new(400.0, 300.0), 1e-9));
        assert!(session.align_pending());
    }

    #[test]
    fn test_reset_cropping() {
        let mut session = landscape_session();
        session.set_aspect_ratio(Some(AspectRatio::R1x1.into()), false);
        let now = Instant::now();
        session.handle(GestureEvent::RotationBegan, now);
        session.handle(
            GestureEvent::RotationChanged {
                translation_x: -30.0,
                dial_width: 300.0,
            },
            now,
        );
        session.reset_cropping(false);

        let info = session.crop_info();
        assert!(info.crop_rect().approx_eq(&Rect::new(0.0, 0.0, 800.0, 600.0), 1e-9));
        assert!(!info.is_rotated());
        assert!(!session.is_cropped());
        assert_eq!(session.aspect_ratio(), None);
    }

    #[test]
    fn test_initial_crop_is_clamped_and_silent() {
        let mut session = landscape_session();
        let seen = counter(&mut session);
        let requested = CropInfo::from_rect(
            Size::new(800.0, 600.0),
            Rect::new(600.0, 400.0, 400.0, 400.0),
        );
        session.set_initial_crop(requested, false);

        let rect = session.crop_info().crop_rect();
        assert!(rect.approx_eq(&Rect::new(600.0, 400.0, 200.0, 200.0), 1e-6));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_initial_crop_angle_is_bounded() {
        let mut session = landscape_session();
        let info = CropInfo::with_crop(
            Size::new(800.0, 600.0),
            Size::new(200.0, 200.0),
            Point::new(400.0, 300.0),
            1.0,
        );
        session.set_initial_crop(info, false);
        assert_eq!(session.crop_info().rotation_angle, FRAC_PI_8);
    }

    #[test]
    fn test_render_sink_deduplicates() {
        let mut session = landscape_session();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        session.set_render_sink(move |snapshot: &RenderSnapshot| sink.borrow_mut().push(*snapshot));
        assert_eq!(frames.borrow().len(), 1);

        let now = Instant::now();
        session.handle(GestureEvent::DragBegan(Point::new(16.0, 16.0)), now);
        // Blur switched off.
        assert_eq!(frames.borrow().len(), 2);
        session.handle(GestureEvent::DragChanged(Point::new(40.0, 0.0)), now);
        session.handle(GestureEvent::DragChanged(Point::new(40.0, 0.0)), now);
        assert_eq!(frames.borrow().len(), 3);

        let frames = frames.borrow();
        for pair in frames.windows(2) {
            assert!(!pair[0].same_state(&pair[1]));
        }
    }

    #[test]
    fn test_layout_change_keeps_selection() {
        let mut session = landscape_session();
        session.set_aspect_ratio(Some(AspectRatio::R4x5.into()), false);
        let before = session.crop_info();
        let size = Size::new(600.0, 900.0);
        let max = session.options().max_crop_frame(size);
        session.handle(
            GestureEvent::LayoutChanged {
                viewport: size,
                max_crop_frame: max,
            },
            Instant::now(),
        );
        let after = session.crop_info();
        assert!(after.crop_size.approx_eq(before.crop_size, 1e-6));
        assert!(after.rotation_center.approx_eq(before.rotation_center, 1e-6));
        assert_eq!(session.resize_engine().bounding_frame(), max);
    }

    #[test]
    fn test_drive_consumes_queue() {
        let mut session = landscape_session();
        let mut queue: VecDeque<GestureEvent> = VecDeque::from([
            GestureEvent::DragBegan(Point::new(16.0, 16.0)),
            GestureEvent::DragChanged(Point::new(50.0, 30.0)),
            GestureEvent::DragEnded,
        ]);
        assert_eq!(session.drive(&mut queue, Instant::now()), 3);
        assert!(queue.is_empty());
        assert!(session.is_cropped());
    }

    #[test]
    fn test_full_crop_extraction_keeps_dimensions() {
        let bitmap = gradient(64, 48);
        let session = CropSession::new(
            Arc::new(bitmap.clone()),
            Size::new(400.0, 400.0),
            CropOptions::default(),
        )
        .unwrap();
        let result = session.create_cropped_image().unwrap();
        assert_eq!((result.width, result.height), (bitmap.width, bitmap.height));
        assert_eq!(result.pixels, bitmap.pixels);
    }

    #[test]
    fn test_create_cropped_image_without_pixels() {
        let session = landscape_session();
        assert_eq!(session.create_cropped_image(), None);
    }

    #[test]
    fn test_extraction_job_runs_on_worker() {
        let bitmap = gradient(40, 30);
        // Crop area of 20x20 so the selection is shown at zoom 2.
        let mut session = CropSession::new(
            Arc::new(bitmap),
            Size::new(52.0, 52.0),
            CropOptions::default(),
        )
        .unwrap();
        session.set_initial_crop(
            CropInfo::from_rect(Size::new(40.0, 30.0), Rect::new(5.0, 5.0, 10.0, 10.0)),
            false,
        );
        let job = session.extraction_job();
        let result = std::thread::spawn(move || job.run()).join().unwrap().unwrap();
        assert_eq!((result.width, result.height), (10, 10));
        assert_eq!(result.pixel(0, 0), [5, 5, 0]);
    }

    #[test]
    fn test_job_knows_interaction_thread() {
        let session = landscape_session();
        let job = session.extraction_job();
        assert!(job.on_interaction_thread());
        let on_worker = std::thread::spawn(move || job.on_interaction_thread())
            .join()
            .unwrap();
        assert!(!on_worker);
    }

    #[test]
    fn test_create_cropped_image_warns_on_interaction_thread() {
        let session = CropSession::new(
            Arc::new(gradient(64, 48)),
            Size::new(400.0, 400.0),
            CropOptions::default(),
        )
        .unwrap();
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();

        let result =
            tracing::subscriber::with_default(subscriber, || session.create_cropped_image());
        assert!(result.is_some());
        assert!(logs.text().contains("interaction thread"));
    }
}
