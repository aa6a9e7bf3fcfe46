// 端到端验证：地形生成、可见性、缩放
use yama::scene::SurfaceStyle;
use yama::terrain::{
    ExplicitPeaksConfig, HeightField, HeightPolicy, NoiseConfig, Peak, PeakZone, PlaneGrid,
    ZoneSet, ZonedRidgeConfig,
};
use yama::{
    AnimatorState, Background, BackgroundConfig, BackgroundResult, FrameScheduler, Host,
    HostEvent, Scene, SceneRenderer,
};

struct PageHost {
    reduced_motion: bool,
    size: (u32, u32),
    mounted: usize,
}

impl PageHost {
    fn new(reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            size: (1600, 900),
            mounted: 0,
        }
    }
}

impl Host for PageHost {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.size
    }

    fn mount_surface(&mut self, _style: &SurfaceStyle) -> BackgroundResult<()> {
        self.mounted += 1;
        Ok(())
    }
}

#[derive(Default)]
struct FrameCounter(usize);

impl FrameScheduler for FrameCounter {
    fn request_frame(&mut self) {
        self.0 += 1;
    }
}

#[derive(Default)]
struct NullRenderer {
    frames: usize,
}

impl SceneRenderer for NullRenderer {
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, scene: &Scene) {
        assert!(scene.terrain.live.iter().flatten().all(|v| v.is_finite()));
        self.frames += 1;
    }
}

fn small_config() -> BackgroundConfig {
    BackgroundConfig {
        grid: PlaneGrid::new(20.0, 20.0, 8, 8),
        ..Default::default()
    }
}

#[test]
fn test_single_peak_rises_above_the_edges() {
    println!("\n=== Single centred peak ===");

    let grid = PlaneGrid::new(6.0, 6.0, 3, 3);
    let policy = HeightPolicy::ExplicitPeaks(ExplicitPeaksConfig {
        peaks: vec![Peak::new(0.0, 0.0, 8.0, 2.0)],
        ..Default::default()
    });
    let field = HeightField::new(NoiseConfig::default(), policy);
    let samples = field.generate(&grid);
    assert_eq!(samples.len(), 16);

    let mut inner = Vec::new();
    let mut edge = Vec::new();
    for iz in 0..grid.rows() {
        for ix in 0..grid.columns() {
            let h = samples[grid.index(ix, iz)].elevation;
            if ix == 0 || iz == 0 || ix == grid.seg_x || iz == grid.seg_z {
                edge.push(h);
            } else {
                inner.push(h);
            }
        }
    }

    let lowest_inner = inner.iter().cloned().fold(f64::INFINITY, f64::min);
    let highest_edge = edge.iter().cloned().fold(0.0, f64::max);
    println!("  lowest centre vertex: {:.3}", lowest_inner);
    println!("  highest edge vertex:  {:.3}", highest_edge);

    assert_eq!(inner.len(), 4);
    assert!(lowest_inner > highest_edge);

    println!("✓ centre stands above the rim");
}

#[test]
fn test_gentle_floor_without_zone_influence() {
    println!("\n=== Gentle floor outside peak zones ===");

    let config = ZonedRidgeConfig {
        gentle_floor: 0.22,
        zones: ZoneSet::new(PeakZone::new([0.5, 0.5], 0.2, 0.0), Vec::new()),
        ..Default::default()
    };
    let field = HeightField::new(NoiseConfig::default(), HeightPolicy::ZonedRidge(config));
    let grid = PlaneGrid::new(70.0, 75.0, 16, 16);

    for (x, z) in grid.positions() {
        let sample = field.sample(&grid, x, z);
        let raw = field.terrain_before_zoning(x, z).unwrap();
        assert_eq!(sample.influence, 0.0);
        assert!(
            (sample.elevation - (raw * 0.22).max(0.0)).abs() < 1e-9,
            "({x}, {z}): {} vs raw {raw}",
            sample.elevation
        );
    }

    println!("✓ every vertex keeps 22% of its terrain");
}

/// Boot then schedule the first frame, the way both hosts start the background
fn boot_and_start(host: &mut PageHost, frames: &mut FrameCounter) -> Option<Background> {
    let background = Background::boot(host, small_config()).unwrap()?;
    background.start(frames);
    Some(background)
}

#[test]
fn test_reduced_motion_mounts_nothing() {
    let mut frames = FrameCounter::default();
    let mut host = PageHost::new(true);
    let background = boot_and_start(&mut host, &mut frames);

    assert!(background.is_none());
    assert_eq!(host.mounted, 0);
    assert_eq!(frames.0, 0);

    // same sequence with motion allowed does mount and schedule
    let mut host = PageHost::new(false);
    let background = boot_and_start(&mut host, &mut frames);
    assert!(background.is_some());
    assert_eq!(host.mounted, 1);
    assert_eq!(frames.0, 1);
}

#[test]
fn test_resize_only_touches_the_camera() {
    let mut host = PageHost::new(false);
    let mut background = Background::boot(&mut host, small_config()).unwrap().unwrap();
    let (mut frames, mut renderer) = (FrameCounter::default(), NullRenderer::default());

    let before: Vec<[f32; 3]> = background.scene().terrain.base.clone();
    background.handle(
        HostEvent::Resized {
            width: 1920,
            height: 600,
        },
        &mut frames,
        &mut renderer,
    );

    assert!((background.scene().camera.aspect() - 3.2).abs() < 1e-6);
    assert_eq!(background.scene().terrain.base, before);
    assert!(background
        .scene()
        .camera
        .view_proj()
        .to_cols_array()
        .iter()
        .all(|v| v.is_finite()));
}

#[test]
fn test_hidden_page_does_not_jump_ahead() {
    println!("\n=== Visibility round trip ===");

    let mut host = PageHost::new(false);
    let mut background = Background::boot(&mut host, small_config()).unwrap().unwrap();
    let (mut frames, mut renderer) = (FrameCounter::default(), NullRenderer::default());

    background.start(&mut frames);
    for i in 0..=30 {
        background.handle(
            HostEvent::Frame {
                now: 10.0 + i as f64 / 60.0,
            },
            &mut frames,
            &mut renderer,
        );
    }
    let shown = background.elapsed();
    println!("  elapsed before hiding: {:.3}s", shown);

    background.handle(HostEvent::VisibilityChanged { hidden: true }, &mut frames, &mut renderer);
    let requested = frames.0;
    background.handle(HostEvent::Frame { now: 40.0 }, &mut frames, &mut renderer);
    assert_eq!(background.state(), AnimatorState::Paused);
    assert_eq!(frames.0, requested);

    background.handle(HostEvent::VisibilityChanged { hidden: false }, &mut frames, &mut renderer);
    background.handle(HostEvent::Frame { now: 100.0 }, &mut frames, &mut renderer);
    background.handle(HostEvent::Frame { now: 100.5 }, &mut frames, &mut renderer);

    println!("  elapsed after returning: {:.3}s", background.elapsed());
    assert!((background.elapsed() - (shown + 0.5)).abs() < 1e-9);
    assert_eq!(renderer.frames, 33);

    println!("✓ hidden time skipped");
}

#[test]
fn test_both_policies_stay_non_negative() {
    for config in [BackgroundConfig::default(), BackgroundConfig::five_peaks()] {
        let field = HeightField::new(config.noise, config.policy.clone());
        let samples = field.generate(&config.grid);
        assert_eq!(samples.len(), config.grid.vertex_count());
        let min = samples
            .iter()
            .map(|s| s.elevation)
            .fold(f64::INFINITY, f64::min);
        println!("{}: min elevation {:.4}", field.policy().name(), min);
        assert!(min >= 0.0);
    }
}
