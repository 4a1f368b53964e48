//! Startup banner: "TT-KIOSK" in figlet's standard font with a vertical gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

const BANNER_TEXT: &str = "TT-KIOSK";

/// School navy (#1f3a93).
const NAVY: (u8, u8, u8) = (0x1f, 0x3a, 0x93);
/// Bell gold (#f5b700).
const GOLD: (u8, u8, u8) = (0xf5, 0xb7, 0x00);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn render() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(BANNER_TEXT).map(|f| f.to_string()))
        .unwrap_or_else(|| BANNER_TEXT.to_string())
}

/// Prints the banner, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let art = render();
    let lines: Vec<&str> = art.lines().filter(|l| !l.trim().is_empty()).collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(NAVY, GOLD, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: GOLD.0,
        g: GOLD.1,
        b: GOLD.2,
    }));
    let _ = out.execute(Print(format!("timetable kiosk v{}\r\n", env!("CARGO_PKG_VERSION"))));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
