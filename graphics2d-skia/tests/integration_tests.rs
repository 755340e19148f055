//! Integration tests for graphics2d-skia.
//!
//! Most tests drive a `Graphics2d` over a canvas that records every engine
//! call; the pixel tests at the end use the tiny-skia canvas.

use graphics2d_skia::kurbo::{Affine, BezPath, Point, Rect, Shape as _};
use graphics2d_skia::tiny_skia::{self, BlendMode, FillRule, Pixmap, Transform};
use graphics2d_skia::*;
use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Save(usize),
    Restore,
    RestoreToCount(usize),
    SetMatrix(Transform),
    Concat(Transform),
    ClipPath {
        bounds: tiny_skia::Rect,
        rule: FillRule,
        matrix: Transform,
    },
    ClipEmpty,
    DrawRect(tiny_skia::Rect, PaintStyle),
    DrawOval(tiny_skia::Rect, PaintStyle),
    DrawLine,
    DrawPath {
        bounds: tiny_skia::Rect,
        rule: FillRule,
        style: PaintStyle,
    },
    DrawImageRect {
        src: tiny_skia::Rect,
        dst: tiny_skia::Rect,
    },
    DrawTextBlob(usize),
}

impl Call {
    fn is_draw(&self) -> bool {
        matches!(
            self,
            Call::DrawRect(..)
                | Call::DrawOval(..)
                | Call::DrawLine
                | Call::DrawPath { .. }
                | Call::DrawImageRect { .. }
                | Call::DrawTextBlob(_)
        )
    }
}

/// Records engine calls and tracks the matrix stack.
struct RecordingCanvas {
    calls: Vec<Call>,
    paints: Vec<EnginePaint>,
    matrix: Transform,
    stack: Vec<Transform>,
}

impl RecordingCanvas {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            paints: Vec::new(),
            matrix: Transform::identity(),
            stack: Vec::new(),
        }
    }

    fn draws(&self) -> Vec<Call> {
        self.calls.iter().filter(|c| c.is_draw()).cloned().collect()
    }

    fn draw(&mut self, call: Call, paint: &EnginePaint) {
        self.calls.push(call);
        self.paints.push(paint.clone());
    }
}

impl TargetCanvas for RecordingCanvas {
    fn width(&self) -> u32 {
        200
    }

    fn height(&self) -> u32 {
        100
    }

    fn save(&mut self) -> usize {
        let count = self.save_count();
        self.calls.push(Call::Save(count));
        self.stack.push(self.matrix);
        count
    }

    fn restore(&mut self) {
        self.calls.push(Call::Restore);
        if let Some(m) = self.stack.pop() {
            self.matrix = m;
        }
    }

    fn restore_to_count(&mut self, count: usize) {
        self.calls.push(Call::RestoreToCount(count));
        while self.save_count() > count.max(1) {
            if let Some(m) = self.stack.pop() {
                self.matrix = m;
            }
        }
    }

    fn save_count(&self) -> usize {
        self.stack.len() + 1
    }

    fn set_matrix(&mut self, matrix: Transform) {
        self.calls.push(Call::SetMatrix(matrix));
        self.matrix = matrix;
    }

    fn concat(&mut self, matrix: Transform) {
        self.calls.push(Call::Concat(matrix));
        self.matrix = self.matrix.pre_concat(matrix);
    }

    fn total_matrix(&self) -> Transform {
        self.matrix
    }

    fn clip_path(&mut self, path: &tiny_skia::Path, rule: FillRule, _anti_alias: bool) {
        self.calls.push(Call::ClipPath {
            bounds: path.bounds(),
            rule,
            matrix: self.matrix,
        });
    }

    fn clip_empty(&mut self) {
        self.calls.push(Call::ClipEmpty);
    }

    fn draw_rect(&mut self, rect: tiny_skia::Rect, paint: &EnginePaint) {
        self.draw(Call::DrawRect(rect, paint.style), paint);
    }

    fn draw_oval(&mut self, rect: tiny_skia::Rect, paint: &EnginePaint) {
        self.draw(Call::DrawOval(rect, paint.style), paint);
    }

    fn draw_line(&mut self, _p0: tiny_skia::Point, _p1: tiny_skia::Point, paint: &EnginePaint) {
        self.draw(Call::DrawLine, paint);
    }

    fn draw_path(&mut self, path: &tiny_skia::Path, rule: FillRule, paint: &EnginePaint) {
        self.draw(
            Call::DrawPath {
                bounds: path.bounds(),
                rule,
                style: paint.style,
            },
            paint,
        );
    }

    fn draw_image_rect(
        &mut self,
        _image: &Pixmap,
        src: tiny_skia::Rect,
        dst: tiny_skia::Rect,
        paint: &EnginePaint,
    ) {
        self.draw(Call::DrawImageRect { src, dst }, paint);
    }

    fn draw_text_blob(&mut self, blob: &TextBlob, _x: f32, _y: f32, paint: &EnginePaint) {
        self.draw(Call::DrawTextBlob(blob.len()), paint);
    }
}

fn typefaces() -> Arc<TypefaceCache> {
    Arc::new(TypefaceCache::new(&FontConfig::from_fonts(Vec::new())))
}

fn recording() -> (Graphics2d, Rc<RefCell<RecordingCanvas>>) {
    let canvas = Rc::new(RefCell::new(RecordingCanvas::new()));
    let g = Graphics2d::from_canvas(canvas.clone(), typefaces());
    canvas.borrow_mut().calls.clear();
    (g, canvas)
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> tiny_skia::Rect {
    tiny_skia::Rect::from_xywh(x, y, w, h).unwrap()
}

fn assert_affine_close(a: Affine, b: Affine) {
    for (x, y) in a.as_coeffs().iter().zip(b.as_coeffs()) {
        assert!((x - y).abs() < 1e-4, "{:?} != {:?}", a, b);
    }
}

// --- Transforms ---

#[test]
fn test_transform_composition_is_order_sensitive() {
    let (mut g, _) = recording();
    g.translate(10.0, 0.0);
    g.scale(2.0, 2.0);
    assert_eq!(g.get_transform() * Point::new(1.0, 1.0), Point::new(12.0, 2.0));

    let (mut g, _) = recording();
    g.scale(2.0, 2.0);
    g.translate(10.0, 0.0);
    assert_eq!(g.get_transform() * Point::new(1.0, 1.0), Point::new(22.0, 2.0));
}

#[test]
fn test_get_transform_is_a_copy() {
    let (mut g, _) = recording();
    g.translate(3.0, 4.0);
    let mut t = g.get_transform();
    t = t * Affine::scale(5.0);
    assert_ne!(t, g.get_transform());
    assert_eq!(g.get_transform(), Affine::translate((3.0, 4.0)));
}

#[test]
fn test_engine_matrix_tracks_transform() {
    let (mut g, canvas) = recording();
    g.translate(5.0, 7.0);
    g.rotate_about(0.5, 20.0, 10.0);
    g.shear(0.25, -0.5);
    g.scale(1.5, 3.0);
    let engine = from_engine_transform(canvas.borrow().total_matrix());
    assert_affine_close(engine, g.get_transform());
}

#[test]
fn test_rotate_about_fixes_the_pivot() {
    let (mut g, _) = recording();
    g.rotate_about(1.2, 30.0, 40.0);
    let p = g.get_transform() * Point::new(30.0, 40.0);
    assert!((p.x - 30.0).abs() < 1e-9 && (p.y - 40.0).abs() < 1e-9);
}

#[test]
fn test_shear_coefficients() {
    let (mut g, _) = recording();
    g.shear(2.0, 3.0);
    assert_eq!(g.get_transform() * Point::new(1.0, 1.0), Point::new(3.0, 4.0));
}

#[test]
fn test_set_transform_none_resets() {
    let (mut g, canvas) = recording();
    g.rotate(1.0);
    g.set_transform(None);
    assert_eq!(g.get_transform(), Affine::IDENTITY);
    assert_eq!(canvas.borrow().total_matrix(), Transform::identity());
    g.set_transform(Some(&Affine::scale(3.0)));
    assert_eq!(
        canvas.borrow().calls.last(),
        Some(&Call::SetMatrix(Transform::from_scale(3.0, 3.0)))
    );
}

// --- Clipping ---

#[test]
fn test_no_clip_by_default() {
    let (g, _) = recording();
    assert!(g.get_clip().is_none());
    assert!(g.get_clip_bounds().is_none());
}

#[test]
fn test_set_clip_protocol() {
    let (mut g, canvas) = recording();
    g.translate(5.0, 5.0);
    canvas.borrow_mut().calls.clear();
    g.set_clip_rect(0.0, 0.0, 10.0, 20.0);

    let calls = canvas.borrow().calls.clone();
    let translate = Transform::from_translate(5.0, 5.0);
    assert_eq!(
        calls,
        vec![
            Call::RestoreToCount(1),
            Call::Save(1),
            Call::SetMatrix(translate),
            Call::SetMatrix(Transform::identity()),
            Call::ClipPath {
                bounds: rect(5.0, 5.0, 10.0, 20.0),
                rule: FillRule::Winding,
                matrix: Transform::identity(),
            },
            Call::SetMatrix(translate),
        ]
    );
}

#[test]
fn test_clip_intersects() {
    let (mut g, _) = recording();
    g.clip_rect(0.0, 0.0, 100.0, 100.0);
    g.clip_rect(50.0, 25.0, 100.0, 100.0);
    assert_eq!(g.get_clip_bounds(), Some(IntRect::new(50, 25, 50, 75)));
    assert_eq!(g.get_clip(), Some(Shape::rect(50.0, 25.0, 50.0, 75.0)));
}

#[test]
fn test_clip_never_grows() {
    let (mut g, _) = recording();
    g.clip_rect(0.0, 0.0, 40.0, 40.0);
    g.clip_rect(-100.0, -100.0, 400.0, 400.0);
    assert_eq!(g.get_clip_bounds(), Some(IntRect::new(0, 0, 40, 40)));
}

#[test]
fn test_disjoint_clip_is_empty() {
    let (mut g, _) = recording();
    g.clip_rect(0.0, 0.0, 10.0, 10.0);
    g.clip_rect(20.0, 20.0, 10.0, 10.0);
    let bounds = g.get_clip_bounds().unwrap();
    assert!(bounds.is_empty());
}

#[test]
fn test_degenerate_clip_uses_bounds() {
    let (mut g, _) = recording();
    g.clip_rect(0.0, 0.0, 50.0, 50.0);
    g.clip(&Shape::line(10.0, 10.0, 30.0, 10.0));
    assert!(g.get_clip_bounds().unwrap().is_empty());
}

#[test]
fn test_non_rect_clip_intersection() {
    let (mut g, _) = recording();
    g.clip(&Shape::ellipse(0.0, 0.0, 100.0, 100.0));
    g.clip_rect(50.0, -10.0, 100.0, 200.0);
    let b = g.get_clip().unwrap().bounds();
    assert!((b.x0 - 50.0).abs() < 0.5 && (b.x1 - 100.0).abs() < 0.5);
    assert!(b.y0.abs() < 0.5 && (b.y1 - 100.0).abs() < 0.5);
}

fn clip_area(g: &Graphics2d) -> f64 {
    g.get_clip().unwrap().to_bez_path().area().abs()
}

#[test]
fn test_covering_clip_keeps_curved_clip() {
    let circle = std::f64::consts::PI * 2500.0;
    let (mut g, _) = recording();
    g.clip(&Shape::ellipse(0.0, 0.0, 100.0, 100.0));
    g.clip_rect(-1e4, -1e4, 2e4, 2e4);
    assert!((clip_area(&g) - circle).abs() < circle * 0.01);

    // A covering shape that is not a rectangle goes through the sweep.
    g.clip(&Shape::polygon(&[(-1e4, -1e4), (1e4, -1e4), (0.0, 1e4)]));
    assert!((clip_area(&g) - circle).abs() < circle * 0.01);
}

#[test]
fn test_negative_clip_stays_empty_when_rotated() {
    let (mut g, canvas) = recording();
    g.set_clip_rect(10.0, 10.0, -5.0, 4.0);
    assert!(g.get_clip_bounds().unwrap().is_empty());

    g.rotate(0.3);
    canvas.borrow_mut().calls.clear();
    g.set_clip_rect(10.0, 10.0, -5.0, 4.0);
    assert!(g.get_clip_bounds().unwrap().is_empty());
    assert!(canvas.borrow().calls.contains(&Call::ClipEmpty));
    g.set_clip(Some(&Shape::ellipse(10.0, 10.0, 5.0, -4.0)));
    assert!(g.get_clip_bounds().unwrap().is_empty());
}

#[rstest]
#[case(Affine::scale(2.0))]
#[case(Affine::translate((15.0, -4.0)))]
#[case(Affine::scale_non_uniform(0.5, 4.0) * Affine::translate((3.0, 3.0)))]
fn test_clip_reported_in_current_user_space(#[case] t: Affine) {
    let (mut g, _) = recording();
    g.set_clip_rect(10.0, 10.0, 40.0, 40.0);
    g.transform(&t);
    let reported = g.get_clip().unwrap().bounds();
    let expected = t.inverse().transform_rect_bbox(Rect::new(10.0, 10.0, 50.0, 50.0));
    assert!((reported.x0 - expected.x0).abs() < 1e-9);
    assert!((reported.y0 - expected.y0).abs() < 1e-9);
    assert!((reported.x1 - expected.x1).abs() < 1e-9);
    assert!((reported.y1 - expected.y1).abs() < 1e-9);
}

#[test]
fn test_clip_survives_transform_changes() {
    let (mut g, _) = recording();
    g.scale(2.0, 2.0);
    g.set_clip_rect(10.0, 10.0, 10.0, 10.0);
    g.set_transform(None);
    assert_eq!(g.get_clip(), Some(Shape::Rect(Rect::new(20.0, 20.0, 40.0, 40.0))));
}

#[test]
fn test_non_invertible_transform_reports_empty_clip() {
    let (mut g, _) = recording();
    g.set_clip_rect(0.0, 0.0, 10.0, 10.0);
    g.scale(0.0, 1.0);
    let clip = g.get_clip().unwrap();
    assert!(clip.is_degenerate());
    assert!(g.get_clip_bounds().unwrap().is_empty());
}

#[test]
fn test_set_clip_none_clears() {
    let (mut g, canvas) = recording();
    g.set_clip_rect(0.0, 0.0, 10.0, 10.0);
    canvas.borrow_mut().calls.clear();
    g.set_clip(None);
    assert!(g.get_clip().is_none());
    let calls = canvas.borrow().calls.clone();
    assert!(!calls.iter().any(|c| matches!(c, Call::ClipPath { .. })));
    assert_eq!(calls[0], Call::RestoreToCount(1));
}

#[test]
fn test_hit() {
    let (mut g, _) = recording();
    let shape = Shape::rect(10.0, 10.0, 20.0, 20.0);
    assert!(g.hit(IntRect::new(15, 15, 2, 2), &shape, false));
    assert!(!g.hit(IntRect::new(50, 50, 2, 2), &shape, false));
    // Inside the interior but away from the outline.
    assert!(!g.hit(IntRect::new(19, 19, 2, 2), &shape, true));
    assert!(g.hit(IntRect::new(9, 15, 2, 2), &shape, true));

    g.translate(100.0, 0.0);
    assert!(g.hit(IntRect::new(115, 15, 2, 2), &shape, false));
    g.set_clip_rect(0.0, 0.0, 5.0, 5.0);
    assert!(!g.hit(IntRect::new(115, 15, 2, 2), &shape, false));
}

// --- Attributes and errors ---

#[test]
fn test_null_arguments() {
    let (mut g, _) = recording();
    g.set_color(Some(Color::RED));
    g.set_stroke(Some(&BasicStroke::new(3.0))).unwrap();

    assert!(matches!(
        g.set_stroke(None),
        Err(Graphics2dError::NullArgument(_))
    ));
    assert!(matches!(
        g.set_composite(None),
        Err(Graphics2dError::NullArgument(_))
    ));
    g.set_paint(None);
    g.set_color(None);
    g.set_font(None);

    assert_eq!(g.get_color(), Color::RED);
    assert_eq!(g.get_paint(), &Paint::Color(Color::RED));
    assert_eq!(g.get_stroke(), &BasicStroke::new(3.0));
    assert_eq!(g.get_composite(), &Composite::default());
    assert_eq!(g.get_font(), &Font::default());
}

#[test]
fn test_defaults() {
    let (g, _) = recording();
    assert_eq!(g.get_transform(), Affine::IDENTITY);
    assert_eq!(g.get_paint(), &Paint::Color(Color::BLACK));
    assert_eq!(g.get_stroke(), &BasicStroke::default());
    assert_eq!(g.get_background(), Color::WHITE);
    assert_eq!(g.get_font().family, "SansSerif");
    assert_eq!(
        g.get_rendering_hint(HintKey::Antialiasing),
        Some(&HintValue::On)
    );
    assert_eq!(
        g.device_configuration().bounds,
        IntRect::new(0, 0, 200, 100)
    );
    assert!(g.font_render_context().antialiased);
}

#[test]
fn test_set_paint_gradient_keeps_color() {
    let (mut g, _) = recording();
    g.set_color(Some(Color::GREEN));
    let gradient = Paint::Gradient(GradientPaint::new(
        Point::new(0.0, 0.0),
        Color::RED,
        Point::new(10.0, 0.0),
        Color::BLUE,
        false,
    ));
    g.set_paint(Some(&gradient));
    assert_eq!(g.get_paint(), &gradient);
    assert_eq!(g.get_color(), Color::GREEN);
}

#[test]
fn test_stroke_width_is_clamped_in_engine() {
    let (mut g, canvas) = recording();
    g.set_stroke(Some(&BasicStroke::new(0.0))).unwrap();
    g.draw_rect_xywh(0.0, 0.0, 10.0, 10.0);
    assert_eq!(g.get_stroke().width, 0.0);
    assert_eq!(canvas.borrow().paints[0].stroke.width, MIN_STROKE_WIDTH);
}

#[test]
fn test_composite_reaches_engine() {
    let (mut g, canvas) = recording();
    let ac = AlphaComposite::new(AlphaRule::DstOut, 0.25).unwrap();
    g.set_composite(Some(&Composite::Alpha(ac))).unwrap();
    g.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);
    // XOR is accepted and leaves the blend mode alone.
    g.set_composite(Some(&Composite::Alpha(AlphaComposite::of(AlphaRule::Xor))))
        .unwrap();
    g.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);
    g.set_paint_mode();
    g.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);

    let paints = canvas.borrow().paints.clone();
    assert_eq!(paints[0].blend_mode, BlendMode::DestinationOut);
    assert_eq!(paints[0].alpha, 0.25);
    assert_eq!(paints[1].blend_mode, BlendMode::DestinationOut);
    assert_eq!(paints[1].alpha, 1.0);
    assert_eq!(paints[2].blend_mode, BlendMode::SourceOver);
}

#[test]
fn test_custom_composite_is_stored_only() {
    let (mut g, canvas) = recording();
    let ac = AlphaComposite::new(AlphaRule::SrcOver, 0.5).unwrap();
    g.set_composite(Some(&Composite::Alpha(ac))).unwrap();
    let glow = Composite::Custom("glow".to_string());
    g.set_composite(Some(&glow)).unwrap();
    g.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);

    assert_eq!(g.get_composite(), &glow);
    let paints = canvas.borrow().paints.clone();
    assert_eq!(paints[0].blend_mode, BlendMode::SourceOver);
    assert_eq!(paints[0].alpha, 0.5);
}

#[test]
fn test_rendering_hints() {
    let (mut g, canvas) = recording();
    g.set_rendering_hint(HintKey::Antialiasing, HintValue::Off)
        .unwrap();
    assert!(g
        .set_rendering_hint(HintKey::Interpolation, HintValue::On)
        .is_err());
    g.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);
    assert!(!canvas.borrow().paints[0].anti_alias);

    let mut more = RenderingHints::empty();
    more.insert(HintKey::Interpolation, HintValue::NearestNeighbor)
        .unwrap();
    g.add_rendering_hints(&more);
    assert_eq!(g.get_rendering_hints().len(), 2);

    g.set_rendering_hints(RenderingHints::default());
    assert_eq!(g.get_rendering_hints().len(), 1);
    g.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);
    assert!(canvas.borrow().paints[1].anti_alias);
}

#[test]
fn test_font_mapping_hint_is_consulted() {
    let (mut g, _) = recording();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mapper: FontNameMapper = Arc::new(move |name: &str| {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(format!("{} Mapped", name))
    });
    g.set_rendering_hint(HintKey::FontMapping, HintValue::FontMapper(mapper))
        .unwrap();
    g.set_font(Some(&Font::new("Serif", FontStyle::BOLD, 14.0)));
    assert_eq!(g.get_font().family, "Serif");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The miss is memoized under the requested name.
    g.set_font(Some(&Font::default()));
    g.set_font(Some(&Font::new("Serif", FontStyle::BOLD, 14.0)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// --- create / dispose ---

fn solid(paint: &EnginePaint) -> Option<tiny_skia::Color> {
    match paint.shader {
        tiny_skia::Shader::SolidColor(c) => Some(c),
        _ => None,
    }
}

#[test]
fn test_create_copies_and_isolates() {
    let (mut g, canvas) = recording();
    let half = Composite::Alpha(AlphaComposite::new(AlphaRule::SrcOver, 0.5).unwrap());
    let serif = Font::new("Serif", FontStyle::ITALIC, 18.0);
    g.translate(10.0, 10.0);
    g.set_color(Some(Color::BLUE));
    g.set_background(Color::GREEN);
    g.set_composite(Some(&half)).unwrap();
    g.set_font(Some(&serif));
    g.set_stroke(Some(&BasicStroke::new(4.0))).unwrap();
    g.set_rendering_hint(HintKey::Antialiasing, HintValue::Off)
        .unwrap();
    g.set_clip_rect(0.0, 0.0, 50.0, 50.0);

    let mut child = g.create();
    assert_eq!(child.get_transform(), g.get_transform());
    assert_eq!(child.get_color(), Color::BLUE);
    assert_eq!(child.get_background(), Color::GREEN);
    assert_eq!(child.get_composite(), &half);
    assert_eq!(child.get_font(), &serif);
    assert_eq!(child.get_stroke(), &BasicStroke::new(4.0));
    assert_eq!(
        child.get_rendering_hint(HintKey::Antialiasing),
        Some(&HintValue::Off)
    );
    assert_eq!(child.get_clip(), g.get_clip());

    // Child changes stay in the child.
    child.translate(5.0, 0.0);
    child.set_color(Some(Color::RED));
    child.set_background(Color::BLACK);
    child.set_paint_mode();
    child.set_font(Some(&Font::default()));
    child.set_stroke(Some(&BasicStroke::new(1.0))).unwrap();
    child
        .set_rendering_hint(HintKey::Antialiasing, HintValue::On)
        .unwrap();
    child.clip_rect(0.0, 0.0, 10.0, 10.0);
    assert_eq!(g.get_transform(), Affine::translate((10.0, 10.0)));
    assert_eq!(g.get_color(), Color::BLUE);
    assert_eq!(g.get_background(), Color::GREEN);
    assert_eq!(g.get_composite(), &half);
    assert_eq!(g.get_font(), &serif);
    assert_eq!(g.get_stroke(), &BasicStroke::new(4.0));
    assert_eq!(
        g.get_rendering_hint(HintKey::Antialiasing),
        Some(&HintValue::Off)
    );
    assert_eq!(g.get_clip_bounds(), Some(IntRect::new(0, 0, 50, 50)));

    // Parent changes do not reach the child.
    g.set_color(Some(Color::WHITE));
    g.set_background(Color::RED);
    g.set_stroke(Some(&BasicStroke::new(9.0))).unwrap();
    g.set_composite(Some(&Composite::default())).unwrap();
    g.set_font(Some(&Font::new("Monospaced", FontStyle::BOLD, 10.0)));
    g.rotate(1.0);
    assert_eq!(child.get_transform(), Affine::translate((15.0, 10.0)));
    assert_eq!(child.get_color(), Color::RED);
    assert_eq!(child.get_background(), Color::BLACK);
    assert_eq!(child.get_stroke(), &BasicStroke::new(1.0));
    assert_eq!(child.get_composite(), &Composite::default());
    assert_eq!(child.get_font(), &Font::default());
    assert_eq!(child.get_clip_bounds(), Some(IntRect::new(0, 0, 10, 10)));

    // Each context draws with its own engine paint.
    canvas.borrow_mut().paints.clear();
    child.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);
    let paints = canvas.borrow().paints.clone();
    assert_eq!(solid(&paints[0]), Some(tiny_skia::Color::from_rgba8(255, 0, 0, 255)));
    assert_eq!(paints[0].alpha, 1.0);
    assert!(paints[0].anti_alias);

    let depth = canvas.borrow().save_count();
    child.dispose();
    assert!(canvas.borrow().save_count() < depth);
    // Parent's save levels are still in place.
    assert!(canvas.borrow().save_count() >= 2);
}

#[test]
fn test_dispose_releases_save_levels() {
    let canvas = Rc::new(RefCell::new(RecordingCanvas::new()));
    let mut g = Graphics2d::from_canvas(canvas.clone(), typefaces());
    g.set_clip_rect(0.0, 0.0, 10.0, 10.0);
    assert_eq!(canvas.borrow().save_count(), 2);
    g.dispose();
    assert_eq!(canvas.borrow().save_count(), 1);
    g.dispose();
    assert_eq!(canvas.borrow().save_count(), 1);
}

// --- Drawing dispatch ---

#[test]
fn test_fast_paths() {
    let (mut g, canvas) = recording();
    g.fill(&Shape::rect(1.0, 2.0, 3.0, 4.0));
    g.fill(&Shape::ellipse(0.0, 0.0, 10.0, 5.0));
    g.draw(&Shape::line(0.0, 0.0, 5.0, 5.0));
    g.fill(&Shape::round_rect(0.0, 0.0, 20.0, 20.0, 4.0, 4.0));
    let draws = canvas.borrow().draws();
    assert_eq!(draws[0], Call::DrawRect(rect(1.0, 2.0, 3.0, 4.0), PaintStyle::Fill));
    assert_eq!(draws[1], Call::DrawOval(rect(0.0, 0.0, 10.0, 5.0), PaintStyle::Fill));
    assert_eq!(draws[2], Call::DrawLine);
    assert!(matches!(
        draws[3],
        Call::DrawPath {
            rule: FillRule::Winding,
            style: PaintStyle::Fill,
            ..
        }
    ));
}

#[test]
fn test_degenerate_fills_issue_no_draw() {
    let (mut g, canvas) = recording();
    g.fill_rect_xywh(0.0, 0.0, 0.0, 10.0);
    g.fill_rect_xywh(0.0, 0.0, 10.0, -1.0);
    g.fill_oval(0.0, 0.0, 0.0, 0.0);
    g.fill(&Shape::line(0.0, 0.0, 10.0, 10.0));
    g.draw_rect_xywh(0.0, 0.0, -5.0, 5.0);
    g.draw_polyline(&[]);
    assert!(canvas.borrow().draws().is_empty());

    // A zero-width stroked rectangle is still a line on screen.
    g.draw_rect_xywh(0.0, 0.0, 0.0, 5.0);
    assert_eq!(canvas.borrow().draws().len(), 1);
}

#[test]
fn test_winding_rule_reaches_engine() {
    let (mut g, canvas) = recording();
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((10.0, 0.0));
    path.line_to((10.0, 10.0));
    path.close_path();
    g.fill(&Shape::path(path.clone(), WindingRule::EvenOdd));
    g.fill(&Shape::path(path, WindingRule::NonZero));
    g.fill_polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]);
    let rules: Vec<FillRule> = canvas
        .borrow()
        .draws()
        .iter()
        .filter_map(|c| match c {
            Call::DrawPath { rule, .. } => Some(*rule),
            _ => None,
        })
        .collect();
    assert_eq!(
        rules,
        vec![FillRule::EvenOdd, FillRule::Winding, FillRule::EvenOdd]
    );
}

#[test]
fn test_convenience_forms() {
    let (mut g, canvas) = recording();
    g.draw_line_xy(0.0, 0.0, 1.0, 1.0);
    g.draw_oval(0.0, 0.0, 4.0, 4.0);
    g.draw_round_rect(0.0, 0.0, 10.0, 10.0, 2.0, 2.0);
    g.fill_round_rect(0.0, 0.0, 10.0, 10.0, 2.0, 2.0);
    g.draw_arc(0.0, 0.0, 10.0, 10.0, 0.0, 90.0);
    g.fill_arc(0.0, 0.0, 10.0, 10.0, 0.0, 90.0);
    g.draw_polyline(&[(0.0, 0.0), (5.0, 5.0)]);
    g.draw_polygon(&[(0.0, 0.0), (5.0, 5.0), (0.0, 5.0)]);
    g.copy_area(0, 0, 5, 5, 1, 1);
    let draws = canvas.borrow().draws();
    assert_eq!(draws.len(), 8);
    assert_eq!(draws[1], Call::DrawOval(rect(0.0, 0.0, 4.0, 4.0), PaintStyle::Stroke));
}

#[test]
fn test_clear_rect_uses_background_and_restores() {
    let (mut g, canvas) = recording();
    g.set_color(Some(Color::RED));
    g.set_background(Color::BLUE);
    g.clear_rect(0.0, 0.0, 10.0, 10.0);
    g.fill_rect_xywh(0.0, 0.0, 10.0, 10.0);

    let paints = canvas.borrow().paints.clone();
    assert_eq!(paints[0].blend_mode, BlendMode::Source);
    assert!(matches!(
        paints[0].shader,
        tiny_skia::Shader::SolidColor(c) if c == tiny_skia::Color::from_rgba8(0, 0, 255, 255)
    ));
    assert_eq!(paints[1].blend_mode, BlendMode::SourceOver);
    assert_eq!(g.get_paint(), &Paint::Color(Color::RED));
}

// --- Images ---

#[test]
fn test_draw_image_with_background() {
    let (mut g, canvas) = recording();
    let img = ImageData::filled(4, 2, [255, 0, 0, 128]).unwrap();
    assert!(g.draw_image(&img, 10.0, 20.0, Some(Color::WHITE)));
    let draws = canvas.borrow().draws();
    assert_eq!(draws[0], Call::DrawRect(rect(10.0, 20.0, 4.0, 2.0), PaintStyle::Fill));
    assert_eq!(
        draws[1],
        Call::DrawImageRect {
            src: rect(0.0, 0.0, 4.0, 2.0),
            dst: rect(10.0, 20.0, 4.0, 2.0),
        }
    );
    assert_eq!(g.get_paint(), &Paint::Color(Color::BLACK));
}

#[test]
fn test_draw_image_overloads() {
    let (mut g, canvas) = recording();
    let img = ImageData::filled(8, 8, [0, 0, 0, 255]).unwrap();
    assert!(g.draw_image_scaled(&img, 0.0, 0.0, 16.0, 4.0, None));
    assert!(g.draw_image_region(
        &img,
        Rect::new(20.0, 0.0, 0.0, 10.0),
        Rect::new(0.0, 0.0, 4.0, 4.0),
        None
    ));
    assert!(g.draw_image_transformed(&img, &Affine::rotate(0.3)));

    let calls = canvas.borrow().calls.clone();
    let images: Vec<&Call> = calls
        .iter()
        .filter(|c| matches!(c, Call::DrawImageRect { .. }))
        .collect();
    assert_eq!(images.len(), 3);
    assert_eq!(
        images[1],
        &Call::DrawImageRect {
            src: rect(0.0, 0.0, 4.0, 4.0),
            dst: rect(0.0, 0.0, 20.0, 10.0),
        }
    );
    // The mirrored region and the transformed image each push a matrix.
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::Concat(_))).count(),
        2
    );
    // Every image draw is bracketed by save/restore.
    assert_eq!(canvas.borrow().save_count(), 2);
}

#[test]
fn test_source_past_image_edge_shrinks_destination() {
    let (mut g, canvas) = recording();
    let img = ImageData::filled(4, 4, [255, 0, 0, 255]).unwrap();
    assert!(g.draw_image_region(
        &img,
        Rect::new(0.0, 0.0, 8.0, 8.0),
        Rect::new(0.0, 0.0, 8.0, 8.0),
        Some(Color::WHITE)
    ));
    assert_eq!(
        canvas.borrow().draws(),
        vec![
            Call::DrawRect(rect(0.0, 0.0, 4.0, 4.0), PaintStyle::Fill),
            Call::DrawImageRect {
                src: rect(0.0, 0.0, 4.0, 4.0),
                dst: rect(0.0, 0.0, 4.0, 4.0),
            },
        ]
    );

    // Mirrored: the background covers the flipped position of the image.
    canvas.borrow_mut().calls.clear();
    g.draw_image_region(
        &img,
        Rect::new(20.0, 0.0, 0.0, 10.0),
        Rect::new(-4.0, 0.0, 4.0, 4.0),
        Some(Color::WHITE),
    );
    let draws = canvas.borrow().draws();
    assert_eq!(draws[0], Call::DrawRect(rect(0.0, 0.0, 10.0, 10.0), PaintStyle::Fill));
    assert_eq!(
        draws[1],
        Call::DrawImageRect {
            src: rect(0.0, 0.0, 4.0, 4.0),
            dst: rect(10.0, 0.0, 10.0, 10.0),
        }
    );
}

// --- Text ---

#[test]
fn test_text_without_fonts_draws_nothing() {
    let (mut g, canvas) = recording();
    g.draw_string("hello", 10.0, 20.0);
    g.draw_attributed_string(&AttributedString::new("plain"), 0.0, 0.0);
    assert!(canvas.borrow().draws().is_empty());
    assert_eq!(g.create_glyph_vector("abc").num_glyphs(), 0);

    let metrics = g.get_font_metrics();
    assert!((metrics.ascent - 9.6).abs() < 1e-4);
    let big = g.get_font_metrics_for(&Font::default().with_size(24.0));
    assert!(big.height() > metrics.height());
}

#[test]
fn test_draw_glyph_vector_fills_outlines() {
    let (mut g, canvas) = recording();
    let mut outline = BezPath::new();
    outline.move_to((0.0, -8.0));
    outline.line_to((6.0, -8.0));
    outline.line_to((6.0, 0.0));
    outline.line_to((0.0, 0.0));
    outline.close_path();
    let gv = GlyphVector {
        font: Font::default(),
        glyphs: vec![Glyph {
            id: 7,
            x: 0.0,
            advance: 7.0,
            outline,
        }],
    };
    g.draw_glyph_vector(&gv, 10.0, 20.0);
    assert_eq!(
        canvas.borrow().draws(),
        vec![Call::DrawPath {
            bounds: rect(10.0, 12.0, 6.0, 8.0),
            rule: FillRule::Winding,
            style: PaintStyle::Fill,
        }]
    );
}

fn tuffy_data() -> Vec<u8> {
    std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/Tuffy.ttf")).unwrap()
}

fn tuffy_typefaces() -> Arc<TypefaceCache> {
    let data = tuffy_data();
    let config = FontConfig {
        generic_families: GenericFamilyMap {
            sans_serif: vec!["Tuffy".to_string()],
            ..GenericFamilyMap::default()
        },
        ..FontConfig::from_fonts(vec![Arc::new(data)])
    };
    Arc::new(TypefaceCache::new(&config))
}

fn recording_with_tuffy() -> (Graphics2d, Rc<RefCell<RecordingCanvas>>) {
    let canvas = Rc::new(RefCell::new(RecordingCanvas::new()));
    let mut g = Graphics2d::from_canvas(canvas.clone(), tuffy_typefaces());
    g.set_font(Some(&Font::new("SansSerif", FontStyle::PLAIN, 20.0)));
    canvas.borrow_mut().calls.clear();
    (g, canvas)
}

#[test]
fn test_draw_string_issues_text_blob() {
    let (mut g, canvas) = recording_with_tuffy();
    g.set_color(Some(Color::BLUE));
    g.draw_string("Hello", 10.0, 20.0);
    g.draw_attributed_string(&AttributedString::new("Hi"), 10.0, 40.0);
    g.draw_string("", 10.0, 60.0);

    assert_eq!(
        canvas.borrow().draws(),
        vec![Call::DrawTextBlob(5), Call::DrawTextBlob(2)]
    );
    let paints = canvas.borrow().paints.clone();
    assert_eq!(paints[0].style, PaintStyle::Fill);
    assert_eq!(solid(&paints[0]), Some(tiny_skia::Color::from_rgba8(0, 0, 255, 255)));
}

#[test]
fn test_attributed_runs_use_their_foreground() {
    let (mut g, canvas) = recording_with_tuffy();
    g.set_color(Some(Color::GREEN));
    let mut text = AttributedString::new("HHOOXX");
    let colored = |c: Color| TextAttributes {
        foreground: Some(Paint::Color(c)),
        ..TextAttributes::default()
    };
    text.add_attributes(0..2, colored(Color::RED)).unwrap();
    text.add_attributes(2..4, colored(Color::BLUE)).unwrap();
    g.draw_attributed_string(&text, 5.0, 30.0);

    let recorded = canvas.borrow();
    assert!(recorded
        .draws()
        .iter()
        .all(|c| matches!(c, Call::DrawPath { style: PaintStyle::Fill, .. })));
    let mut colors: Vec<tiny_skia::Color> = recorded.paints.iter().filter_map(solid).collect();
    assert_eq!(colors.len(), 6);
    colors.dedup();
    assert_eq!(
        colors,
        vec![
            tiny_skia::Color::from_rgba8(255, 0, 0, 255),
            tiny_skia::Color::from_rgba8(0, 0, 255, 255),
            tiny_skia::Color::from_rgba8(0, 255, 0, 255),
        ]
    );
    drop(recorded);

    // The context paint is back once the runs are drawn.
    assert_eq!(g.get_paint(), &Paint::Color(Color::GREEN));
    g.fill_rect_xywh(0.0, 0.0, 5.0, 5.0);
    let last = canvas.borrow().paints.last().cloned().unwrap();
    assert_eq!(solid(&last), Some(tiny_skia::Color::from_rgba8(0, 255, 0, 255)));
}

#[test]
fn test_attributed_glyphs_sit_on_the_baseline() {
    let (mut g, canvas) = recording_with_tuffy();
    let mut text = AttributedString::new("H");
    text.add_attributes(
        0..1,
        TextAttributes {
            bold: Some(false),
            ..TextAttributes::default()
        },
    )
    .unwrap();
    g.draw_attributed_string(&text, 50.0, 40.0);
    let draws = canvas.borrow().draws();
    let Call::DrawPath { bounds, .. } = &draws[0] else {
        panic!("expected a glyph path, got {:?}", draws[0]);
    };
    // Cap height above the baseline, nothing below it.
    assert!(bounds.left() >= 50.0 && bounds.left() < 55.0);
    assert!(bounds.top() > 20.0 && bounds.top() < 40.0);
    assert!((bounds.bottom() - 40.0).abs() < 0.5);
}

#[test]
fn test_font_metrics_and_glyphs_from_face() {
    let (g, _) = recording_with_tuffy();
    let data = tuffy_data();
    let face = ttf_parser::Face::parse(&data, 0).unwrap();
    let scale = 20.0 / face.units_per_em() as f32;
    let metrics = g.get_font_metrics();
    assert!((metrics.ascent - face.ascender() as f32 * scale).abs() < 1e-3);
    assert!((metrics.descent + face.descender() as f32 * scale).abs() < 1e-3);
    assert!(metrics.ascent > 10.0 && metrics.descent > 0.0);
    assert!(metrics.string_width("HH") > metrics.string_width("H"));

    let gv = g.create_glyph_vector("HI");
    assert_eq!(gv.num_glyphs(), 2);
    assert!(gv.glyphs.iter().all(|glyph| glyph.id != 0));
    assert!(gv.glyphs[1].x > 0.0);
    let bounds = gv.visual_bounds();
    assert!(bounds.width() > 0.0 && bounds.height() > 0.0);
}

#[test]
fn test_pixels_draw_string() {
    let canvas = Rc::new(RefCell::new(SkiaCanvas::new(60, 30).unwrap()));
    let mut g = Graphics2d::from_canvas(canvas.clone(), tuffy_typefaces());
    g.set_font(Some(&Font::new("SansSerif", FontStyle::PLAIN, 24.0)));
    g.draw_string("H", 5.0, 25.0);
    let data = canvas.borrow().image_data();
    let inked = data.chunks(4).filter(|px| px[3] > 0).count();
    assert!(inked > 20, "only {} pixels inked", inked);
    // Nothing lands above the cap height.
    assert_eq!(canvas.borrow().pixel(10, 1), Some([0, 0, 0, 0]));
}

// --- Path conversion ---

#[rstest]
#[case(Shape::rect(3.0, 4.0, 50.0, 60.0))]
#[case(Shape::ellipse(-10.0, 5.0, 30.0, 12.0))]
#[case(Shape::round_rect(0.0, 0.0, 40.0, 20.0, 10.0, 10.0))]
#[case(Shape::polygon(&[(0.0, 0.0), (30.0, 5.0), (10.0, 25.0)]))]
fn test_path_round_trip_preserves_bounds(#[case] shape: Shape) {
    let engine = shape_to_engine_path(&shape).unwrap();
    let back = from_engine_path(&engine);
    let a = shape.bounds().abs();
    let b = Shape::path(back, WindingRule::NonZero).bounds();
    assert!((a.x0 - b.x0).abs() < 1e-3 && (a.y0 - b.y0).abs() < 1e-3);
    assert!((a.x1 - b.x1).abs() < 1e-3 && (a.y1 - b.y1).abs() < 1e-3);
    let e = engine_bounds(&engine);
    assert!((e.x0 - a.x0).abs() < 1e-3 && (e.y1 - a.y1).abs() < 1e-3);
}

// --- Pixels ---

fn skia(width: u32, height: u32) -> (Graphics2d, Rc<RefCell<SkiaCanvas>>) {
    let canvas = Rc::new(RefCell::new(SkiaCanvas::new(width, height).unwrap()));
    let g = Graphics2d::from_canvas(canvas.clone(), typefaces());
    (g, canvas)
}

#[test]
fn test_pixels_fill_rect() {
    let (mut g, canvas) = skia(50, 50);
    g.set_color(Some(Color::RED));
    g.fill_rect_xywh(10.0, 10.0, 20.0, 20.0);
    assert_eq!(canvas.borrow().pixel(20, 20), Some([255, 0, 0, 255]));
    assert_eq!(canvas.borrow().pixel(40, 40), Some([0, 0, 0, 0]));
}

#[test]
fn test_pixels_clip_replacement_widens() {
    let (mut g, canvas) = skia(40, 20);
    g.set_rendering_hint(HintKey::Antialiasing, HintValue::Off)
        .unwrap();
    g.set_clip_rect(0.0, 0.0, 10.0, 20.0);
    g.fill_rect_xywh(0.0, 0.0, 40.0, 20.0);
    assert_eq!(canvas.borrow().pixel(25, 10), Some([0, 0, 0, 0]));

    g.set_clip_rect(20.0, 0.0, 20.0, 20.0);
    g.set_color(Some(Color::GREEN));
    g.fill_rect_xywh(0.0, 0.0, 40.0, 20.0);
    assert_eq!(canvas.borrow().pixel(25, 10), Some([0, 255, 0, 255]));
    assert_eq!(canvas.borrow().pixel(5, 10), Some([0, 0, 0, 255]));
    assert_eq!(canvas.borrow().pixel(15, 10), Some([0, 0, 0, 0]));
}

#[test]
fn test_pixels_transformed_clip() {
    let (mut g, canvas) = skia(40, 40);
    g.set_rendering_hint(HintKey::Antialiasing, HintValue::Off)
        .unwrap();
    g.scale(2.0, 2.0);
    g.clip_rect(0.0, 0.0, 5.0, 5.0);
    g.set_transform(None);
    g.fill_rect_xywh(0.0, 0.0, 40.0, 40.0);
    assert_eq!(canvas.borrow().pixel(8, 8), Some([0, 0, 0, 255]));
    assert_eq!(canvas.borrow().pixel(12, 12), Some([0, 0, 0, 0]));
}

#[test]
fn test_pixels_image_blit() {
    let (mut g, canvas) = skia(20, 20);
    g.set_rendering_hint(HintKey::Interpolation, HintValue::NearestNeighbor)
        .unwrap();
    let img = ImageData::new(1, 1, PixelLayout::Bgra8, false, vec![255, 0, 0, 255]).unwrap();
    g.draw_image_scaled(&img, 0.0, 0.0, 10.0, 10.0, None);
    assert_eq!(canvas.borrow().pixel(5, 5), Some([0, 0, 255, 255]));
    assert_eq!(canvas.borrow().pixel(15, 15), Some([0, 0, 0, 0]));
}

#[test]
fn test_pixels_image_source_past_edge() {
    let (mut g, canvas) = skia(10, 10);
    g.set_rendering_hint(HintKey::Interpolation, HintValue::NearestNeighbor)
        .unwrap();
    let img = ImageData::filled(4, 4, [255, 0, 0, 255]).unwrap();
    g.draw_image_region(
        &img,
        Rect::new(0.0, 0.0, 8.0, 8.0),
        Rect::new(0.0, 0.0, 8.0, 8.0),
        None,
    );
    assert_eq!(canvas.borrow().pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(canvas.borrow().pixel(6, 6), Some([0, 0, 0, 0]));
}

#[test]
fn test_new_validates_dimensions() {
    assert!(matches!(
        Graphics2d::new(0, 10, typefaces()),
        Err(Graphics2dError::InvalidDimensions { .. })
    ));
    let g = Graphics2d::new(64, 32, typefaces()).unwrap();
    let canvas = g.canvas();
    let borrowed = canvas.borrow();
    let pixmap = borrowed.pixmap().unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (64, 32));
}
