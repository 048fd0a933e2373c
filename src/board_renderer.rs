use std::fs::{self, File};
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use tracing::{debug, info};

use crate::card::BingoCard;
use crate::error::{BingoError, BingoResult};
use crate::play_data::CalledValues;
use crate::win::{WinRules, is_covered, winning_lines};

const FONT_CANDIDATES: &[&str] = &[
    "DejaVuSans-Bold", "Arial Bold", "Arial", "Helvetica", "DejaVuSans", "LiberationSans-Bold",
    "LiberationSans", "NotoSans-Bold", "NotoSans-Regular", "NotoSans",
];

const CELL_PX: u32 = 96;
const PADDING: u32 = 20;
const HEADER_PX: u32 = 72;

const BACKGROUND: Rgb<u8> = Rgb([250, 248, 242]);
const GRID_LINE: Rgb<u8> = Rgb([40, 40, 40]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const CALLED: Rgb<u8> = Rgb([255, 214, 102]);
const WINNING: Rgb<u8> = Rgb([134, 207, 120]);

fn font_search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if cfg!(target_os = "macos") {
        dirs.extend([PathBuf::from("/System/Library/Fonts"), PathBuf::from("/Library/Fonts")]);
        if let Some(home) = dirs_next::home_dir() {
            dirs.push(home.join("Library/Fonts"));
        }
    } else if cfg!(target_os = "windows") {
        if let Some(win) = std::env::var_os("WINDIR") {
            dirs.push(PathBuf::from(win).join("Fonts"));
        }
        dirs.push(PathBuf::from("C:/Windows/Fonts"));
    } else {
        dirs.extend([PathBuf::from("/usr/share/fonts"), PathBuf::from("/usr/local/share/fonts")]);
        if let Some(data) = dirs_next::font_dir() {
            dirs.push(data);
        }
        if let Some(home) = dirs_next::home_dir() {
            dirs.push(home.join(".fonts"));
        }
    }
    dirs
}

/// Font bytes for the sheet. `BINGO_FONT_PATH` wins over the system search.
fn find_system_font_data() -> Option<Vec<u8>> {
    if let Ok(path) = std::env::var("BINGO_FONT_PATH") {
        if let Ok(bytes) = fs::read(&path) {
            return Some(bytes);
        }
    }

    let font_files: Vec<PathBuf> = font_search_dirs()
        .into_iter()
        .filter(|dir| dir.exists())
        .flat_map(|dir| {
            walkdir::WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"))
                        .unwrap_or(false)
                })
        })
        .collect();

    for &candidate in FONT_CANDIDATES {
        let hit = font_files.iter().find(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case(candidate))
                .unwrap_or(false)
        });
        if let Some(bytes) = hit.and_then(|p| fs::read(p).ok()) {
            debug!(font = %candidate, "using candidate font");
            return Some(bytes);
        }
    }

    // digits plus the FREE label are all a sheet needs
    font_files
        .iter()
        .filter_map(|p| fs::read(p).ok())
        .find(|bytes| {
            Font::try_from_vec(bytes.clone())
                .map(|font| "0123456789FRE".chars().all(|c| font.glyph(c).id().0 != 0))
                .unwrap_or(false)
        })
}

struct TextPainter {
    font: Font<'static>,
    scale: Scale,
}

impl TextPainter {
    fn new(font_data: Vec<u8>, px: f32) -> BingoResult<Self> {
        let font = Font::try_from_vec(font_data)
            .ok_or_else(|| BingoError::Render("invalid font data".into()))?;
        Ok(Self {
            font,
            scale: Scale::uniform(px),
        })
    }

    fn with_scale(&self, px: f32) -> Self {
        Self {
            font: self.font.clone(),
            scale: Scale::uniform(px),
        }
    }

    fn text_width(&self, text: &str) -> f32 {
        self.font
            .layout(text, self.scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Draws `text` centered in the `size`×`size` box at (`left`, `top`).
    fn draw_centered(&self, img: &mut RgbImage, text: &str, left: u32, top: u32, size: u32, color: Rgb<u8>) {
        let v = self.font.v_metrics(self.scale);
        let height = v.ascent - v.descent;
        let x = left as f32 + (size as f32 - self.text_width(text)) / 2.0;
        let baseline = top as f32 + (size as f32 - height) / 2.0 + v.ascent;

        for glyph in self.font.layout(text, self.scale, point(x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                if coverage < 0.05 {
                    return;
                }
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px as u32 >= img.width() || py as u32 >= img.height() {
                    return;
                }
                let dst = img.get_pixel_mut(px as u32, py as u32);
                for i in 0..3 {
                    dst[i] = (dst[i] as f32 * (1.0 - coverage) + color[i] as f32 * coverage) as u8;
                }
            });
        }
    }
}

fn fill_rect(img: &mut RgbImage, left: u32, top: u32, size: u32, color: Rgb<u8>) {
    for y in top..(top + size).min(img.height()) {
        for x in left..(left + size).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Column letters across the top; only the classic 5-wide card has them.
fn header_letters(grid_size: usize) -> Option<[&'static str; 5]> {
    (grid_size == 5).then_some(["B", "I", "N", "G", "O"])
}

/// Called cells shaded yellow, cells on a completed line green.
pub fn render_card_to_png(card: &BingoCard, called: &CalledValues, rules: WinRules, path: &Path) -> BingoResult<()> {
    let grid_size = card.grid_size() as u32;
    let grid_px = grid_size * CELL_PX;
    let header_px = if header_letters(card.grid_size()).is_some() { HEADER_PX } else { 0 };
    let img_w = grid_px + PADDING * 2;
    let img_h = grid_px + header_px + PADDING * 2;
    let grid_top = PADDING + header_px;

    let mut img = RgbImage::from_pixel(img_w, img_h, BACKGROUND);

    let on_winning_line: Vec<usize> = winning_lines(card, called, rules)
        .into_iter()
        .flat_map(|line| line.cells(card.grid_size()))
        .collect();

    for cell in 0..card.cells().len() {
        let row = cell as u32 / grid_size;
        let col = cell as u32 % grid_size;
        let shade = if on_winning_line.contains(&cell) {
            Some(WINNING)
        } else if is_covered(card, cell, called, rules) {
            Some(CALLED)
        } else {
            None
        };
        if let Some(color) = shade {
            fill_rect(&mut img, PADDING + col * CELL_PX, grid_top + row * CELL_PX, CELL_PX, color);
        }
    }

    for i in 0..=grid_size {
        let y = grid_top + i * CELL_PX;
        if y < img_h {
            for x in PADDING..=(PADDING + grid_px) {
                img.put_pixel(x, y, GRID_LINE);
            }
        }
        let x = PADDING + i * CELL_PX;
        if x < img_w {
            for y in grid_top..=(grid_top + grid_px) {
                img.put_pixel(x, y, GRID_LINE);
            }
        }
    }

    let font_data = find_system_font_data()
        .ok_or_else(|| BingoError::Render("no system font found for rendering".into()))?;
    let numbers = TextPainter::new(font_data, 36.0)?;
    let labels = numbers.with_scale(22.0);

    if let Some(letters) = header_letters(card.grid_size()) {
        let header = numbers.with_scale(56.0);
        for (col, letter) in letters.iter().enumerate() {
            let left = PADDING + col as u32 * CELL_PX + (CELL_PX - HEADER_PX) / 2;
            header.draw_centered(&mut img, letter, left, PADDING, HEADER_PX, TEXT);
        }
    }

    for (cell, value) in card.cells().iter().enumerate() {
        let left = PADDING + (cell as u32 % grid_size) * CELL_PX;
        let top = grid_top + (cell as u32 / grid_size) * CELL_PX;
        if card.is_free(cell) {
            labels.draw_centered(&mut img, "FREE", left, top, CELL_PX, TEXT);
        } else {
            numbers.draw_centered(&mut img, &value.to_string(), left, top, CELL_PX, TEXT);
        }
    }

    let mut file = File::create(path)?;
    img.write_to(&mut file, image::ImageFormat::Png)
        .map_err(|e| BingoError::Render(e.to_string()))?;
    info!(card = card.index(), path = %path.display(), "card sheet written");
    Ok(())
}
