use eframe::egui;
use shortcut_panel::visibility::{apply_visibility, panel_position};

use mock_ctx::MockCtx;

#[test]
fn hide_parks_window_offscreen() {
    let ctx = MockCtx::default();
    apply_visibility(false, &ctx, None, (2000.0, 2000.0));
    let cmds = ctx.take();
    assert_eq!(cmds.len(), 2);
    match cmds[0] {
        egui::ViewportCommand::OuterPosition(pos) => {
            assert_eq!(pos, egui::pos2(2000.0, 2000.0));
        }
        _ => panic!("unexpected command"),
    }
    assert!(matches!(cmds[1], egui::ViewportCommand::Visible(false)));
    assert_eq!(ctx.repaint_count(), 1);
}

#[test]
fn show_moves_restores_and_focuses() {
    let ctx = MockCtx::default();
    apply_visibility(true, &ctx, Some((40.0, 60.0)), (2000.0, 2000.0));
    let cmds = ctx.take();
    assert_eq!(cmds.len(), 4);
    match cmds[0] {
        egui::ViewportCommand::OuterPosition(pos) => assert_eq!(pos, egui::pos2(40.0, 60.0)),
        _ => panic!("unexpected command"),
    }
    assert!(matches!(cmds[1], egui::ViewportCommand::Visible(true)));
    assert!(matches!(cmds[2], egui::ViewportCommand::Minimized(false)));
    assert!(matches!(cmds[3], egui::ViewportCommand::Focus));
}

#[test]
fn show_without_position_keeps_window_where_it_is() {
    let ctx = MockCtx::default();
    apply_visibility(true, &ctx, None, (2000.0, 2000.0));
    let cmds = ctx.take();
    assert_eq!(cmds.len(), 3);
    assert!(matches!(cmds[0], egui::ViewportCommand::Visible(true)));
}

#[test]
fn panel_is_pulled_back_onto_screen() {
    let pos = panel_position((1800.0, 1000.0), (720.0, 460.0), Some((1920.0, 1080.0)));
    assert_eq!(pos, (1200.0, 620.0));

    let inside = panel_position((100.0, 100.0), (720.0, 460.0), Some((1920.0, 1080.0)));
    assert_eq!(inside, (100.0, 100.0));
}

#[test]
fn panel_never_goes_negative() {
    let pos = panel_position((50.0, 50.0), (720.0, 460.0), Some((640.0, 400.0)));
    assert_eq!(pos, (0.0, 0.0));
    assert_eq!(panel_position((-10.0, 5.0), (10.0, 10.0), None), (0.0, 5.0));
}
