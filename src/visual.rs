//! Screenshot comparison against stored baselines.

use anyhow::{Context, Result};
use image::{ImageEncoder, Rgba, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::VisualConfig;
use crate::locator::Locator;
use crate::page::PageDriver;
use crate::types::{BoundingBox, ViewportSize};
use crate::webdriver::BrowserType;

const DISABLE_ANIMATIONS_CSS: &str = "*, *::before, *::after {
    animation: none !important;
    transition: none !important;
}";

const HIDE_DYNAMIC_CSS: &str = ".dynamic-date,
.loading-indicator {
    visibility: hidden !important;
}";

/// Fill colour for masked regions
const MASK_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);
const DIFF_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Fix the viewport, stop animations and hide content that changes between runs
pub async fn prepare_for_visual_test(driver: &dyn PageDriver, viewport: ViewportSize) -> Result<()> {
    driver.set_viewport(viewport).await?;
    driver
        .add_style(DISABLE_ANIMATIONS_CSS)
        .await
        .context("Failed to disable animations")?;
    driver
        .add_style(HIDE_DYNAMIC_CSS)
        .await
        .context("Failed to hide dynamic content")?;
    Ok(())
}

/// Pixel-level difference between two screenshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageDiff {
    pub diff_pixels: usize,
    pub total_pixels: usize,
    /// Fraction of differing pixels (0.0-1.0)
    pub ratio: f64,
    pub max_color_diff: u32,
    #[serde(skip)]
    pub diff_image: RgbaImage,
}

/// Compare two images of equal size. A pixel differs when the summed RGB
/// channel distance exceeds `color_threshold`.
pub fn compare_images(actual: &RgbaImage, expected: &RgbaImage, color_threshold: u8) -> Result<ImageDiff> {
    if actual.dimensions() != expected.dimensions() {
        anyhow::bail!(
            "Image dimensions differ: actual {}x{}, expected {}x{}",
            actual.width(),
            actual.height(),
            expected.width(),
            expected.height()
        );
    }

    let (width, height) = actual.dimensions();
    let mut diff_image = RgbaImage::new(width, height);
    let mut diff_pixels = 0usize;
    let mut max_color_diff = 0u32;

    for (x, y, a) in actual.enumerate_pixels() {
        let distance = pixel_distance(*a, *expected.get_pixel(x, y));
        if distance > u32::from(color_threshold) {
            diff_pixels += 1;
            max_color_diff = max_color_diff.max(distance);
            diff_image.put_pixel(x, y, DIFF_COLOR);
        } else {
            let Rgba([r, g, b, _]) = *a;
            diff_image.put_pixel(x, y, Rgba([r / 2, g / 2, b / 2, 128]));
        }
    }

    let total_pixels = (width as usize) * (height as usize);
    let ratio = if total_pixels == 0 {
        0.0
    } else {
        diff_pixels as f64 / total_pixels as f64
    };

    Ok(ImageDiff {
        diff_pixels,
        total_pixels,
        ratio,
        max_color_diff,
        diff_image,
    })
}

fn pixel_distance(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .take(3)
        .map(|(x, y)| (i32::from(*x) - i32::from(*y)).unsigned_abs())
        .sum()
}

/// Paint `regions` (image pixel coordinates) with the mask colour
pub fn paint_masks(image: &mut RgbaImage, regions: &[BoundingBox]) {
    let (width, height) = image.dimensions();
    for region in regions {
        let x0 = region.x.max(0.0).floor() as u32;
        let y0 = region.y.max(0.0).floor() as u32;
        let x1 = ((region.x + region.width).ceil().max(0.0) as u32).min(width);
        let y1 = ((region.y + region.height).ceil().max(0.0) as u32).min(height);
        for y in y0..y1 {
            for x in x0..x1 {
                image.put_pixel(x, y, MASK_COLOR);
            }
        }
    }
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("Failed to encode PNG")?;
    Ok(buffer)
}

/// Result of checking one screenshot against its baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VisualOutcome {
    Matched { ratio: f64 },
    BaselineCreated { path: PathBuf },
    BaselineUpdated { path: PathBuf, ratio: f64 },
    Mismatch {
        ratio: f64,
        actual: PathBuf,
        diff: Option<PathBuf>,
        reason: String,
    },
}

impl VisualOutcome {
    pub fn passed(&self) -> bool {
        !matches!(self, VisualOutcome::Mismatch { .. })
    }
}

/// Compares named screenshots against `<baseline_dir>/<name>-<browser>.png`
pub struct VisualComparator {
    config: VisualConfig,
    browser: BrowserType,
}

impl VisualComparator {
    pub fn new(config: VisualConfig, browser: BrowserType) -> Self {
        Self { config, browser }
    }

    fn file_name(&self, name: &str, suffix: &str) -> String {
        let stem = name.trim_end_matches(".png");
        format!("{}-{}{}.png", stem, self.browser, suffix)
    }

    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.config.baseline_dir.join(self.file_name(name, ""))
    }

    /// Check a PNG screenshot. `masks` are painted over before comparing and
    /// before any baseline is written.
    pub fn check(&self, name: &str, png: &[u8], masks: &[BoundingBox]) -> Result<VisualOutcome> {
        let mut actual = image::load_from_memory(png)
            .context("Failed to decode screenshot")?
            .to_rgba8();
        paint_masks(&mut actual, masks);

        let baseline_path = self.baseline_path(name);
        if !baseline_path.exists() {
            if self.config.update_baselines {
                write_file(&baseline_path, &encode_png(&actual)?)?;
                info!("Created baseline {}", baseline_path.display());
                return Ok(VisualOutcome::BaselineCreated {
                    path: baseline_path,
                });
            }
            let actual_path = self.write_actual(name, &actual)?;
            return Ok(VisualOutcome::Mismatch {
                ratio: 1.0,
                actual: actual_path,
                diff: None,
                reason: format!("Baseline not found: {}", baseline_path.display()),
            });
        }

        let expected = image::open(&baseline_path)
            .with_context(|| format!("Failed to read baseline {}", baseline_path.display()))?
            .to_rgba8();

        let (ratio, diff, reason) = match compare_images(&actual, &expected, self.config.color_threshold) {
            Ok(diff) if diff.ratio <= self.config.max_diff_ratio => {
                debug!("{} matched ({:.4} differing)", name, diff.ratio);
                return Ok(VisualOutcome::Matched { ratio: diff.ratio });
            }
            Ok(diff) => {
                let reason = format!(
                    "{} of {} pixels differ ({:.2}%, allowed {:.2}%)",
                    diff.diff_pixels,
                    diff.total_pixels,
                    diff.ratio * 100.0,
                    self.config.max_diff_ratio * 100.0
                );
                (diff.ratio, Some(diff.diff_image), reason)
            }
            Err(e) => (1.0, None, e.to_string()),
        };

        if self.config.update_baselines {
            write_file(&baseline_path, &encode_png(&actual)?)?;
            info!("Updated baseline {} ({})", baseline_path.display(), reason);
            return Ok(VisualOutcome::BaselineUpdated {
                path: baseline_path,
                ratio,
            });
        }

        warn!("Visual mismatch for {}: {}", name, reason);
        let actual_path = self.write_actual(name, &actual)?;
        let diff_path = match diff {
            Some(image) => {
                let path = self.config.diff_dir.join(self.file_name(name, "-diff"));
                write_file(&path, &encode_png(&image)?)?;
                Some(path)
            }
            None => None,
        };

        Ok(VisualOutcome::Mismatch {
            ratio,
            actual: actual_path,
            diff: diff_path,
            reason,
        })
    }

    fn write_actual(&self, name: &str, actual: &RgbaImage) -> Result<PathBuf> {
        let path = self.config.diff_dir.join(self.file_name(name, "-actual"));
        write_file(&path, &encode_png(actual)?)?;
        Ok(path)
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

/// Screenshot `target` (or the viewport), mask `masks` and compare it with the
/// baseline called `name`
pub async fn snapshot(
    driver: &dyn PageDriver,
    comparator: &VisualComparator,
    name: &str,
    target: Option<&Locator>,
    masks: &[Locator],
) -> Result<VisualOutcome> {
    let png = driver.screenshot(target).await?;

    let scale = driver
        .evaluate("return window.devicePixelRatio || 1;", vec![])
        .await?
        .as_f64()
        .unwrap_or(1.0);

    let origin = match target {
        Some(target) => driver
            .bounding_box(target)
            .await?
            .with_context(|| format!("Screenshot target {} disappeared", target))?,
        None => BoundingBox {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        },
    };

    let mut regions = Vec::new();
    for mask in masks {
        for bounds in driver.bounding_boxes(mask).await? {
            let relative = bounds.relative_to(&origin);
            regions.push(BoundingBox {
                x: relative.x * scale,
                y: relative.y * scale,
                width: relative.width * scale,
                height: relative.height * scale,
            });
        }
    }

    comparator.check(name, &png, &regions)
}

#[cfg(test)]
#[path = "visual_test.rs"]
mod visual_test;
