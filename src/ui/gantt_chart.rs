use egui::{Align2, Color32, CursorIcon, Id, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};

use planboard_timeline::engine::{
    BarRow, CaptureGuard, ChartLayout, DateChange, DragState, Edge, GridKind, HitTarget,
    PointerCapture, TimelineChart,
};
use planboard_timeline::model::{Project, TimeScale};

use crate::ui::theme;

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    pub committed: Option<DateChange>,
}

/// Global pointer tracking for the duration of a gesture. The flag lives in
/// egui's temp storage and is cleared when the guard drops.
pub struct EguiPointerCapture {
    ctx: egui::Context,
}

impl EguiPointerCapture {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl PointerCapture for EguiPointerCapture {
    fn acquire(&mut self) -> CaptureGuard {
        let ctx = self.ctx.clone();
        ctx.data_mut(|d| d.insert_temp(capture_id(), true));
        CaptureGuard::new(move || {
            ctx.data_mut(|d| d.remove::<bool>(capture_id()));
            ctx.request_repaint();
        })
    }
}

fn capture_id() -> Id {
    Id::new("timeline-pointer-capture")
}

fn pointer_captured(ctx: &egui::Context) -> bool {
    ctx.data(|d| d.get_temp::<bool>(capture_id()))
        .unwrap_or(false)
}

/// Render the timeline: label column, two-row header, bars, dependency
/// arrows and overlays.
pub fn show_gantt_chart(
    chart: &mut TimelineChart,
    project: &Project,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    handle_zoom(chart, ui);

    let layout = chart.layout(project);
    let available = ui.available_size();
    let content = Vec2::new(
        theme::LABEL_COLUMN_WIDTH + layout.chart_width,
        layout.header_height + layout.chart_height,
    );

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show_viewport(ui, |ui, viewport| {
            let (response, painter) =
                ui.allocate_painter(content.max(available), Sense::click_and_drag());
            let origin = response.rect.min;
            let visible = viewport.translate(origin.to_vec2());
            let body_origin = origin + Vec2::new(theme::LABEL_COLUMN_WIDTH, layout.header_height);
            let body_clip = Rect::from_min_max(
                Pos2::new(
                    visible.left() + theme::LABEL_COLUMN_WIDTH,
                    visible.top() + layout.header_height,
                ),
                visible.max,
            );

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            let body = painter.with_clip_rect(body_clip);
            draw_rows(&body, &layout, body_origin);
            draw_grid(&body, &layout, body_origin, body_clip);
            for bar in &layout.bars {
                draw_bar(&body, &layout, bar, body_origin);
            }
            for edge in &layout.edges {
                draw_edge(&body, edge, body_origin);
            }
            if let Some(x) = layout.today_x {
                draw_today_line(&body, body_origin.x + x, body_clip);
            }

            draw_header(&painter, &layout, body_origin, visible);
            draw_labels(ui, chart, &painter, &layout, body_origin, visible);
            draw_corner(&painter, project, visible, layout.header_height);

            // Pointer handling, after labels so label clicks are registered
            // before a press on the body can start a gesture.
            let ctx = ui.ctx().clone();
            if response.drag_started() && !chart.drag().is_active() {
                if let Some(press) = ctx.input(|i| i.pointer.press_origin()) {
                    if body_clip.contains(press) {
                        chart.press(&layout, press - body_origin.to_vec2());
                    }
                }
            }

            if chart.drag().is_active() {
                if pointer_captured(&ctx) {
                    if let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) {
                        chart.pointer_moved(pos.x - body_origin.x);
                    }
                }
                let (released, escape) =
                    ctx.input(|i| (i.pointer.any_released(), i.key_pressed(egui::Key::Escape)));
                if escape {
                    chart.cancel_gesture();
                } else if released {
                    interaction.committed = chart.release();
                }
                ctx.set_cursor_icon(match chart.drag().state() {
                    DragState::Resizing(_) => CursorIcon::ResizeHorizontal,
                    _ => CursorIcon::Grabbing,
                });
                ctx.request_repaint();
            } else if let Some(pos) = response.hover_pos().filter(|p| body_clip.contains(*p)) {
                hover_feedback(ui, chart, &layout, pos - body_origin.to_vec2());
            }

            if layout.empty {
                painter.text(
                    body_clip.center(),
                    Align2::CENTER_CENTER,
                    "No tasks to display",
                    theme::font_header(),
                    theme::TEXT_DIM,
                );
            }
            if chart.is_updating() {
                draw_saving_overlay(&painter, visible);
            }
        });

    interaction
}

fn handle_zoom(chart: &mut TimelineChart, ui: &Ui) {
    if !ui.rect_contains_pointer(ui.max_rect()) {
        return;
    }
    // egui folds ctrl+wheel into zoom_delta; plain wheels with the modifier
    // held still arrive as scroll on some platforms.
    let (zoom, scroll, modifier) =
        ui.input(|i| (i.zoom_delta(), i.raw_scroll_delta.y, i.modifiers.command));
    if zoom > 1.0 {
        chart.wheel(-1.0, true);
    } else if zoom < 1.0 {
        chart.wheel(1.0, true);
    } else if scroll != 0.0 {
        chart.wheel(-scroll, modifier);
    }
}

fn hover_feedback(ui: &Ui, chart: &TimelineChart, layout: &ChartLayout, pos: Pos2) {
    let Some(target) = layout.hit_test(pos) else {
        return;
    };
    let id = match target {
        HitTarget::ResizeHandle(id) => {
            if chart.can_resize() {
                ui.ctx().set_cursor_icon(CursorIcon::ResizeHorizontal);
            }
            id
        }
        HitTarget::Body(id) => {
            if chart.can_reschedule() {
                ui.ctx().set_cursor_icon(CursorIcon::Grab);
            }
            id
        }
    };
    if let Some(bar) = layout.bar(id) {
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            Id::new(("bar-tip", id)),
            |ui| {
                ui.strong(&bar.name);
                ui.label(format!(
                    "{} → {}",
                    bar.start.format("%d/%m/%Y"),
                    bar.end.format("%d/%m/%Y"),
                ));
                ui.label(format!("Progress: {}%", bar.progress));
            },
        );
    }
}

fn draw_rows(painter: &egui::Painter, layout: &ChartLayout, body_origin: Pos2) {
    for bar in &layout.bars {
        let y = body_origin.y + bar.row as f32 * layout.row_height;
        let row_rect = Rect::from_min_size(
            Pos2::new(body_origin.x, y),
            Vec2::new(layout.chart_width, layout.row_height),
        );
        if bar.row % 2 == 0 {
            painter.rect_filled(row_rect, 0.0, theme::BG_PANEL);
        }
        painter.line_segment(
            [row_rect.left_bottom(), row_rect.right_bottom()],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_grid(painter: &egui::Painter, layout: &ChartLayout, body_origin: Pos2, clip: Rect) {
    let bottom = (body_origin.y + layout.chart_height).max(clip.bottom());
    for line in &layout.grid_lines {
        let x = body_origin.x + line.x;
        let stroke = match line.kind {
            GridKind::Week => Stroke::new(0.5, theme::GRID_LINE),
            GridKind::Month => Stroke::new(1.0, theme::GRID_MONTH),
        };
        painter.line_segment([Pos2::new(x, body_origin.y), Pos2::new(x, bottom)], stroke);
    }
}

fn draw_bar(painter: &egui::Painter, layout: &ChartLayout, bar: &BarRow, body_origin: Pos2) {
    let rect = bar.rect.translate(body_origin.to_vec2());
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let color = theme::bar_color(bar.task_id, bar.color);

    // Soft shadow
    painter.rect_filled(
        rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(rect, rounding, color);
    let highlight = Rect::from_min_size(
        rect.min,
        Vec2::new(rect.width(), (rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if bar.progress > 0 {
        let fraction = f32::from(bar.progress.min(100)) / 100.0;
        let fill = Rect::from_min_size(rect.min, Vec2::new(rect.width() * fraction, rect.height()));
        painter.rect_filled(fill, rounding, theme::PROGRESS_OVERLAY);
    }

    if bar.dragging {
        painter.rect_stroke(
            rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(bar.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = rect.top() + (rect.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(rect.intersect(painter.clip_rect()))
            .galley(Pos2::new(rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }

    if layout.show_handles {
        let handle_h = rect.height() * 0.55;
        let grip = Rect::from_min_size(
            Pos2::new(rect.right() - 5.0, rect.center().y - handle_h / 2.0),
            Vec2::new(3.0, handle_h),
        );
        painter.rect_filled(grip, Rounding::same(1.5), theme::HANDLE_COLOR.gamma_multiply(0.7));
    }
}

fn draw_edge(painter: &egui::Painter, edge: &Edge, body_origin: Pos2) {
    let offset = body_origin.to_vec2();
    let stroke = Stroke::new(1.2, theme::EDGE_COLOR);
    painter.extend(Shape::dashed_line(
        &[edge.from + offset, edge.to + offset],
        stroke,
        theme::DASH_LENGTH,
        theme::GAP_LENGTH,
    ));
    let head = edge.arrow_head(theme::ARROW_SIZE).map(|p| p + offset);
    painter.add(Shape::convex_polygon(head.to_vec(), theme::EDGE_COLOR, Stroke::NONE));
}

fn draw_today_line(painter: &egui::Painter, x: f32, clip: Rect) {
    painter.line_segment(
        [Pos2::new(x, clip.top()), Pos2::new(x, clip.bottom())],
        Stroke::new(1.5, theme::TODAY_LINE),
    );
}

fn draw_header(painter: &egui::Painter, layout: &ChartLayout, body_origin: Pos2, visible: Rect) {
    let top = visible.top();
    let row_h = layout.header_height / 2.0;
    let strip = Rect::from_min_max(
        Pos2::new(visible.left() + theme::LABEL_COLUMN_WIDTH, top),
        Pos2::new(visible.right(), top + layout.header_height),
    );
    let header = painter.with_clip_rect(strip);
    header.rect_filled(strip, 0.0, theme::BG_HEADER);

    for cell in &layout.month_row {
        let (x, w) = layout.cell_span(cell);
        let left = body_origin.x + x;
        header.line_segment(
            [Pos2::new(left, top), Pos2::new(left, top + row_h)],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        // Keep the month name readable while its cell is partly scrolled off.
        let text_x = left.max(strip.left()).min(left + w - 4.0) + 5.0;
        header.text(
            Pos2::new(text_x, top + row_h / 2.0),
            Align2::LEFT_CENTER,
            &cell.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }

    for cell in &layout.scale_row {
        let (x, w) = layout.cell_span(cell);
        let left = body_origin.x + x;
        header.line_segment(
            [Pos2::new(left, top + row_h), Pos2::new(left, top + layout.header_height)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        let weekend = layout.scale == TimeScale::Day && cell.caption.starts_with('S');
        let color = if weekend { theme::TEXT_DIM } else { theme::TEXT_SECONDARY };
        let text = if w >= 60.0 && layout.scale == TimeScale::Day {
            format!("{} {}", cell.caption, cell.label)
        } else {
            cell.label.clone()
        };
        header.text(
            Pos2::new(left + w / 2.0, top + row_h * 1.5),
            Align2::CENTER_CENTER,
            text,
            theme::font_sub(),
            color,
        );
    }

    header.line_segment(
        [strip.left_bottom(), strip.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_labels(
    ui: &mut Ui,
    chart: &mut TimelineChart,
    painter: &egui::Painter,
    layout: &ChartLayout,
    body_origin: Pos2,
    visible: Rect,
) {
    let column = Rect::from_min_max(
        Pos2::new(visible.left(), visible.top() + layout.header_height),
        Pos2::new(visible.left() + theme::LABEL_COLUMN_WIDTH, visible.bottom()),
    );
    let labels = painter.with_clip_rect(column);
    labels.rect_filled(column, 0.0, theme::BG_PANEL);
    labels.line_segment(
        [column.right_top(), column.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let mut activated = None;
    for bar in &layout.bars {
        let y = body_origin.y + bar.row as f32 * layout.row_height;
        let x = column.left() + 10.0 + bar.depth as f32 * theme::INDENT_PER_LEVEL;
        let color = if bar.activatable { theme::TEXT_LINK } else { theme::TEXT_PRIMARY };
        let galley = labels.layout_no_wrap(bar.name.clone(), theme::font_bar(), color);
        let text_rect = Rect::from_min_size(
            Pos2::new(x, y + (layout.row_height - galley.size().y) / 2.0),
            galley.size(),
        );
        labels.galley(text_rect.min, galley, color);

        if bar.activatable {
            let hit = text_rect.intersect(column);
            if hit.is_positive() {
                let response = ui
                    .interact(hit, Id::new(("bar-label", bar.task_id)), Sense::click())
                    .on_hover_cursor(CursorIcon::PointingHand);
                if response.hovered() {
                    labels.line_segment(
                        [text_rect.left_bottom(), text_rect.right_bottom()],
                        Stroke::new(1.0, color),
                    );
                }
                if response.clicked() {
                    activated = Some(bar.task_id);
                }
            }
        }
    }

    if let Some(id) = activated {
        chart.activate(layout, id);
    }
}

fn draw_corner(painter: &egui::Painter, project: &Project, visible: Rect, header_height: f32) {
    let corner = Rect::from_min_size(
        visible.min,
        Vec2::new(theme::LABEL_COLUMN_WIDTH, header_height),
    );
    painter.rect_filled(corner, 0.0, theme::BG_HEADER);
    painter.with_clip_rect(corner).text(
        Pos2::new(corner.left() + 10.0, corner.center().y),
        Align2::LEFT_CENTER,
        &project.name,
        theme::font_header(),
        theme::TEXT_PRIMARY,
    );
    painter.line_segment(
        [corner.left_bottom(), corner.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_saving_overlay(painter: &egui::Painter, visible: Rect) {
    painter.rect_filled(visible, 0.0, theme::BG_OVERLAY);
    let badge = Rect::from_center_size(visible.center(), Vec2::new(110.0, 30.0));
    painter.rect_filled(badge, Rounding::same(6.0), theme::BG_HEADER);
    painter.text(
        badge.center(),
        Align2::CENTER_CENTER,
        format!("{} Saving…", egui_phosphor::regular::SPINNER),
        theme::font_header(),
        theme::TEXT_PRIMARY,
    );
}
