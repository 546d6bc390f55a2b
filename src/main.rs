use std::path::{Path, PathBuf};
use std::time::Duration;

use annotated::caption::{Block, Caption, Span};
use annotated::input::{InputEvent, InputMode};
use annotated::media::Capabilities;
use annotated::widget::{Annotated, CUTOUT_SOLID, HOTSPOT_RADIUS, VIEW_BOX_WIDTH};
use annotated::{Document, Error, Rect};
use clap::Parser;
use eframe::egui;
use image::DynamicImage;

const CAPTION_PADDING: f32 = 8.0;
const CAPTION_BLOCK_GAP: f32 = 4.0;
const BODY_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 18.0;
const CUTOUT_SEGMENTS: usize = 48;
const INFO_RADIUS: f32 = 14.0;
const INFO_INSET: f32 = 24.0;

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "annotated", about = "Interactive hotspots over an image")]
struct Cli {
    /// Annotation document, or a media file with a `.annotated` sidecar
    path: Option<PathBuf>,
    /// Activate hotspots by touch instead of hover
    #[arg(long)]
    touch: bool,
    /// Treat the device as unable to autoplay video and audio
    #[arg(long)]
    no_autoplay: bool,
    /// Derive autoplay support from a browser user agent string
    #[arg(long)]
    user_agent: Option<String>,
    /// Override the overlay opacity
    #[arg(long)]
    opacity: Option<f32>,
    /// Override the fade duration, in milliseconds
    #[arg(long)]
    animation_duration: Option<u64>,
}

impl Cli {
    fn capabilities(&self) -> Capabilities {
        let mut caps = match &self.user_agent {
            Some(ua) => Capabilities::from_user_agent(ua, self.touch),
            None => Capabilities {
                touch: self.touch,
                ..Capabilities::default()
            },
        };
        if self.no_autoplay {
            caps.autoplay = false;
        }
        caps
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

struct AnnotatedApp {
    widget: Annotated,
    base_dir: PathBuf,
    texture: Option<egui::TextureHandle>,
    raw_image: Option<DynamicImage>,

    /// Hotspot currently under the pointer or finger.
    engaged: Option<usize>,
    info_engaged: bool,
}

impl AnnotatedApp {
    fn new(widget: Annotated, base_dir: PathBuf) -> Self {
        let raw_image = widget
            .media()
            .visual
            .as_ref()
            .and_then(|v| v.still())
            .and_then(|still| match image::open(still) {
                Ok(img) => Some(img),
                Err(err) => {
                    log::warn!("cannot open {still}: {}", Error::Image(err));
                    None
                }
            });

        Self {
            widget,
            base_dir,
            texture: None,
            raw_image,
            engaged: None,
            info_engaged: false,
        }
    }

    fn id(&self) -> egui::Id {
        egui::Id::new(self.widget.unique_id())
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(ref img) = self.raw_image {
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            self.texture = Some(ctx.load_texture(
                self.widget.unique_id(),
                color_image,
                egui::TextureOptions::LINEAR,
            ));
        }
    }

    fn anim_secs(&self) -> f32 {
        self.widget.options().animation_duration().as_secs_f32()
    }

    /// Map a view box point onto the media as drawn on screen.
    fn view_to_screen(media_rect: egui::Rect, x: f32, y: f32) -> egui::Pos2 {
        let scale = media_rect.width() / VIEW_BOX_WIDTH;
        media_rect.min + egui::vec2(x * scale, y * scale)
    }

    fn screen_to_view(media_rect: egui::Rect, pos: egui::Pos2) -> (f32, f32) {
        let scale = media_rect.width() / VIEW_BOX_WIDTH;
        let rel = pos - media_rect.min;
        (rel.x / scale, rel.y / scale)
    }

    fn hotspot_box(&self, media_rect: egui::Rect, index: usize) -> Option<Rect> {
        let (x, y) = self.widget.hotspot_center(index)?;
        let center = Self::view_to_screen(media_rect, x, y);
        let r = HOTSPOT_RADIUS * media_rect.width() / VIEW_BOX_WIDTH;
        Some(Rect::from_center(center.x, center.y, r, r))
    }

    fn draw_cutout(&self, painter: &egui::Painter, media_rect: egui::Rect, index: usize, alpha: f32) {
        let Some((x, y)) = self.widget.hotspot_center(index) else {
            return;
        };
        let center = Self::view_to_screen(media_rect, x, y);
        let radius = HOTSPOT_RADIUS * media_rect.width() / VIEW_BOX_WIDTH;

        let Some(ref tex) = self.texture else {
            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(1.5, egui::Color32::from_white_alpha((alpha * 255.0) as u8)),
            );
            return;
        };

        // Redraw the media inside the circle over the overlay: opaque out to
        // CUTOUT_SOLID of the radius, then fading to nothing at the edge.
        let uv = |p: egui::Pos2| {
            let rel = p - media_rect.min;
            egui::pos2(rel.x / media_rect.width(), rel.y / media_rect.height())
        };
        let solid = egui::Color32::from_white_alpha((alpha * 255.0) as u8);
        let mut mesh = egui::Mesh::with_texture(tex.id());
        mesh.vertices.push(egui::epaint::Vertex {
            pos: center,
            uv: uv(center),
            color: solid,
        });
        for i in 0..CUTOUT_SEGMENTS {
            let angle = i as f32 / CUTOUT_SEGMENTS as f32 * std::f32::consts::TAU;
            let dir = egui::vec2(angle.cos(), angle.sin());
            for (r, color) in [
                (radius * CUTOUT_SOLID, solid),
                (radius, egui::Color32::TRANSPARENT),
            ] {
                let pos = center + dir * r;
                mesh.vertices.push(egui::epaint::Vertex {
                    pos,
                    uv: uv(pos),
                    color,
                });
            }
        }
        let n = CUTOUT_SEGMENTS as u32;
        for i in 0..n {
            let inner = 1 + 2 * i;
            let outer = inner + 1;
            let next_inner = 1 + 2 * ((i + 1) % n);
            let next_outer = next_inner + 1;
            mesh.add_triangle(0, inner, next_inner);
            mesh.add_triangle(inner, outer, next_outer);
            mesh.add_triangle(inner, next_outer, next_inner);
        }
        painter.add(egui::Shape::mesh(mesh));
    }

    fn draw_info_affordance(&self, painter: &egui::Painter, center: egui::Pos2) {
        let opacity = self.widget.options().opacity;
        painter.circle_filled(
            center,
            INFO_RADIUS,
            egui::Color32::from_black_alpha((opacity * 255.0) as u8),
        );
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            "i",
            egui::FontId::proportional(16.0),
            egui::Color32::WHITE,
        );
    }

    /// Route hover or touch over the hotspots and the info control into the
    /// widget, according to its input mode.
    fn handle_input(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        container: egui::Rect,
        media_rect: egui::Rect,
        info_center: Option<egui::Pos2>,
        now: Duration,
    ) {
        let (pos, pressed, released, cancelled) = ctx.input(|i| {
            let cancelled = i.events.iter().any(|e| {
                matches!(
                    e,
                    egui::Event::Touch {
                        phase: egui::TouchPhase::Cancel,
                        ..
                    }
                )
            });
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                cancelled,
            )
        });
        let pos = match self.widget.input_mode() {
            InputMode::Pointer => response.hover_pos(),
            InputMode::Touch => pos.filter(|p| container.contains(*p)),
        };

        let over_info = match (info_center, pos) {
            (Some(c), Some(p)) => c.distance(p) <= INFO_RADIUS,
            _ => false,
        };
        let over_hotspot = pos.filter(|_| !over_info).and_then(|p| {
            let (x, y) = Self::screen_to_view(media_rect, p);
            self.widget.hotspot_at(x, y)
        });

        let (leave, enter) = match self.widget.input_mode() {
            InputMode::Pointer => (InputEvent::PointerLeave, InputEvent::PointerEnter),
            InputMode::Touch if cancelled => (InputEvent::TouchCancel, InputEvent::TouchStart),
            InputMode::Touch => (InputEvent::TouchEnd, InputEvent::TouchStart),
        };
        let (target, info_target) = match self.widget.input_mode() {
            InputMode::Pointer => (over_hotspot, over_info),
            InputMode::Touch if released || cancelled => (None, false),
            InputMode::Touch if pressed => (over_hotspot, over_info),
            InputMode::Touch => (self.engaged, self.info_engaged),
        };

        if self.info_engaged != info_target {
            let event = if info_target { enter } else { leave };
            self.widget.handle_info_event(event, now);
            self.info_engaged = info_target;
        }

        if self.engaged != target {
            let container_box = Rect::from(container);
            if let Some(old) = self.engaged {
                if let Some(hotspot_box) = self.hotspot_box(media_rect, old) {
                    self.widget
                        .handle_hotspot_event(old, leave, &hotspot_box, &container_box, |_, _| 0.0);
                }
            }
            if let Some(new) = target {
                if let Some(hotspot_box) = self.hotspot_box(media_rect, new) {
                    let aspect = self.widget.annotation().aspect_ratio();
                    self.widget.handle_hotspot_event(
                        new,
                        enter,
                        &hotspot_box,
                        &container_box,
                        |caption, width| measure_caption(ctx, caption, width, aspect),
                    );
                }
            }
            self.engaged = target;
        }
    }

    fn show_caption(&self, ctx: &egui::Context) {
        let visibility = self.widget.visibility();
        let Some(caption_box) = visibility.caption() else {
            return;
        };
        let alpha = ctx.animate_value_with_time(
            self.id().with("caption"),
            visibility.caption_layer().opacity(1.0),
            self.anim_secs(),
        );
        if alpha <= 0.0 {
            return;
        }
        let Some(caption) = self.widget.caption(caption_box.index) else {
            return;
        };
        let placement = caption_box.placement;
        let in_front = visibility.caption_in_front();
        let aspect = self.widget.annotation().aspect_ratio();
        let inner_width = (placement.width - 2.0 * CAPTION_PADDING).max(1.0);

        egui::Area::new(self.id().with("caption_area"))
            .fixed_pos(egui::pos2(placement.left, placement.top))
            .order(if in_front {
                egui::Order::Foreground
            } else {
                egui::Order::Background
            })
            // never catches the pointer, so hover over the hotspot is stable
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_opacity(alpha);
                egui::Frame::popup(ui.style())
                    .inner_margin(CAPTION_PADDING)
                    .show(ui, |ui| {
                        ui.set_width(inner_width);
                        ui.spacing_mut().item_spacing.y = CAPTION_BLOCK_GAP;
                        for block in &caption.blocks {
                            match block {
                                Block::Text(spans) => {
                                    ui.label(layout_job(spans, inner_width));
                                }
                                Block::Image(img) => {
                                    let size = egui::vec2(inner_width, img.height_at(inner_width, aspect));
                                    ui.add(
                                        egui::Image::new(self.image_uri(&img.src))
                                            .fit_to_exact_size(size),
                                    );
                                }
                            }
                        }
                    });
            });
    }

    fn image_uri(&self, src: &str) -> String {
        if src.contains("://") {
            src.to_string()
        } else {
            format!("file://{}", self.base_dir.join(src).display())
        }
    }
}

fn layout_job(spans: &[Span], width: f32) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = width;
    for span in spans {
        let size = if span.heading { HEADING_SIZE } else { BODY_SIZE };
        let color = if span.bold || span.heading {
            egui::Color32::WHITE
        } else {
            egui::Color32::from_gray(210)
        };
        job.append(
            &span.text,
            0.0,
            egui::TextFormat {
                font_id: egui::FontId::proportional(size),
                color,
                italics: span.italic,
                ..Default::default()
            },
        );
    }
    job
}

/// Height of `caption` drawn `width` wide, frame padding included.
fn measure_caption(ctx: &egui::Context, caption: &Caption, width: f32, aspect: f32) -> f32 {
    let inner = (width - 2.0 * CAPTION_PADDING).max(1.0);
    let content = caption.measure(inner, aspect, |spans, w| {
        ctx.fonts(|f| f.layout_job(layout_job(spans, w))).size().y
    });
    let gaps = caption.blocks.len().saturating_sub(1) as f32 * CAPTION_BLOCK_GAP;
    content + gaps + 2.0 * CAPTION_PADDING
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AnnotatedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        let now = Duration::from_secs_f64(ctx.input(|i| i.time));
        self.widget.tick(now);
        if let Some(deadline) = self.widget.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_sub(now));
        }
        if self.widget.needs_animation() {
            ctx.request_repaint();
        }

        // Space toggles video playback
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            if self.widget.playback().is_playing() {
                self.widget.stop(now);
            } else {
                self.widget.play(now);
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(self.widget.annotation().id()).strong());
                ui.separator();
                ui.label(format!(
                    "{} hotspots, {:?} input",
                    self.widget.annotation().hotspots().len(),
                    self.widget.input_mode()
                ));
                if self.widget.media().is_video() {
                    ui.separator();
                    if ui.button("Play").clicked() {
                        self.widget.play(now);
                    }
                    if ui.button("Stop").clicked() {
                        self.widget.stop(now);
                    }
                    ui.label(format!("Volume: {:.0}%", self.widget.playback().volume() * 100.0));
                }
                if self.widget.media().audio.is_some() {
                    ui.separator();
                    ui.label("audio");
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                let container = response.rect;
                let painter = painter.with_clip_rect(container);

                let wrapper = self.widget.resize(container.width(), container.height());
                let media_rect = egui::Rect::from_min_size(
                    container.min + egui::vec2(wrapper.left, wrapper.top),
                    egui::vec2(wrapper.width, wrapper.height),
                );

                painter.rect_filled(container, 0.0, egui::Color32::from_gray(40));
                match self.texture {
                    Some(ref tex) => {
                        painter.image(
                            tex.id(),
                            media_rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    None => {
                        painter.text(
                            container.center(),
                            egui::Align2::CENTER_CENTER,
                            "no media",
                            egui::FontId::proportional(18.0),
                            egui::Color32::from_gray(160),
                        );
                    }
                }

                let visibility = self.widget.visibility();
                let id = self.id();
                let anim = self.anim_secs();
                let dim = ctx.animate_value_with_time(
                    id.with("dim"),
                    visibility.dim().opacity(1.0),
                    anim,
                );
                let cutouts: Vec<f32> = visibility
                    .cutouts()
                    .iter()
                    .enumerate()
                    .map(|(i, layer)| {
                        ctx.animate_value_with_time(id.with(("cutout", i)), layer.opacity(1.0), anim)
                    })
                    .collect();

                if dim > 0.0 {
                    let alpha = dim * self.widget.options().opacity;
                    painter.rect_filled(
                        media_rect,
                        0.0,
                        egui::Color32::from_black_alpha((alpha * 255.0) as u8),
                    );
                    for (i, cut) in cutouts.iter().enumerate() {
                        if *cut > 0.0 {
                            self.draw_cutout(&painter, media_rect, i, cut * dim);
                        }
                    }
                }

                let info_center = self
                    .widget
                    .info_affordance_visible()
                    .then(|| container.right_top() + egui::vec2(-INFO_INSET, INFO_INSET));
                if let Some(center) = info_center {
                    self.draw_info_affordance(&painter, center);
                }

                self.handle_input(ctx, &response, container, media_rect, info_center, now);
            });

        self.show_caption(ctx);
    }
}

// ── Main ────────────────────────────────────────────────────────────────────

fn pick_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("annotation", &["annotated", "json"])
        .add_filter("media", &["png", "jpg", "jpeg", "gif", "webp"])
        .pick_file()
}

fn load(path: &Path, cli: &Cli) -> Result<(Annotated, PathBuf), Error> {
    let mut document = Document::load(path)?;
    if let Some(opacity) = cli.opacity {
        document.options.opacity = opacity;
    }
    if let Some(ms) = cli.animation_duration {
        document.options.animation_duration_ms = ms;
    }
    let widget = Annotated::from_document(&document, cli.capabilities())?;
    Ok((widget, document.base_dir))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let Some(path) = cli.path.clone().or_else(pick_path) else {
        eprintln!("Usage: annotated <document.annotated|image>");
        std::process::exit(1);
    };

    let (widget, base_dir) = match load(&path, &cli) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let title = format!("annotated — {}", widget.annotation().id());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    let result = eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(AnnotatedApp::new(widget, base_dir)))
        }),
    );
    if let Err(err) = result {
        log::error!("failed to run eframe: {err}");
        std::process::exit(1);
    }
}
