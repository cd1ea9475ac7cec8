use eframe::egui;

/// The slice of `egui::Context` the visibility logic needs, so tests can
/// record commands instead of driving a real window.
pub trait ViewportCtx {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand);
    fn request_repaint(&self);
}

impl ViewportCtx for egui::Context {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand) {
        egui::Context::send_viewport_cmd(self, cmd);
    }

    fn request_repaint(&self) {
        egui::Context::request_repaint(self);
    }
}

/// Place a panel of `size` at `cursor`, pulled back so it stays on a screen
/// of `screen` size when that is known.
pub fn panel_position(
    cursor: (f32, f32),
    size: (f32, f32),
    screen: Option<(f32, f32)>,
) -> (f32, f32) {
    let (mut x, mut y) = cursor;
    if let Some((sw, sh)) = screen {
        if x + size.0 > sw {
            x = sw - size.0;
        }
        if y + size.1 > sh {
            y = sh - size.1;
        }
    }
    (x.max(0.0), y.max(0.0))
}

/// Show the panel at `pos` (or where it was) or park it off-screen.
pub fn apply_visibility<C: ViewportCtx>(
    visible: bool,
    ctx: &C,
    pos: Option<(f32, f32)>,
    offscreen_pos: (f32, f32),
) {
    if visible {
        if let Some((x, y)) = pos {
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(x, y)));
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
        ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(false));
        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
    } else {
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
            offscreen_pos.0,
            offscreen_pos.1,
        )));
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
    }
    ctx.request_repaint();
}
