//! Wave Tiles entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, PointerEvent, WheelEvent};

    use wave_tiles::RenderError;
    use wave_tiles::SceneConfig;
    use wave_tiles::renderer::{OrbitControls, PerspectiveCamera, SceneRenderState};
    use wave_tiles::scene::{self, Color, Scene};
    use wave_tiles::sim::{
        AMPLITUDE_RANGE, AnimationDriver, FrameHost, SimulationState, VELOCITY_RANGE,
        WAVE_LENGTH_RANGE, WaveParams,
    };

    /// Scene, camera and GPU state; everything the driver calls back into
    struct Presenter {
        scene: Scene,
        camera: PerspectiveCamera,
        controls: OrbitControls,
        render_state: Option<SceneRenderState>,
    }

    impl FrameHost for Presenter {
        fn update_controls(&mut self) {
            self.controls.update(&mut self.camera);
        }

        fn render(&mut self, state: &SimulationState) {
            self.scene.sync_spheres(&state.spheres);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.scene, &self.camera) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    /// Application instance holding all state
    struct App {
        driver: AnimationDriver,
        sim: SimulationState,
        presenter: Presenter,
    }

    impl App {
        fn new(config: &SceneConfig, aspect: f32) -> Self {
            let (scene, sim) = scene::build(config);
            Self {
                driver: AnimationDriver::new(config.target_fps),
                sim,
                presenter: Presenter {
                    scene,
                    camera: PerspectiveCamera::from_config(&config.camera, aspect),
                    controls: OrbitControls::default(),
                    render_state: None,
                },
            }
        }

        fn frame(&mut self, time: f64) {
            let Self {
                driver,
                sim,
                presenter,
            } = self;
            driver.frame(time, sim, presenter);
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.presenter.camera.set_viewport(width, height);
            if let Some(ref mut render_state) = self.presenter.render_state {
                render_state.resize(width, height);
            }
        }
    }

    /// Canvas size in device pixels
    fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    fn apply_background(document: &web_sys::Document, color: Color) {
        if let Some(body) = document.body() {
            let _ = body.style().set_property("background-color", &color.to_hex());
        }
    }

    async fn init_gpu(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
        scene: &Scene,
    ) -> Result<SceneRenderState, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        SceneRenderState::new(surface, &adapter, width, height, scene).await
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Wave Tiles starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = canvas_pixel_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let config = SceneConfig::load();
        apply_background(&document, config.background_color);

        let app = Rc::new(RefCell::new(App::new(&config, width as f32 / height as f32)));

        let render_state = {
            let a = app.borrow();
            init_gpu(&canvas, width, height, &a.presenter.scene).await
        };
        match render_state {
            Ok(render_state) => app.borrow_mut().presenter.render_state = Some(render_state),
            Err(e) => {
                log::error!("WebGPU unavailable: {}", e);
                return;
            }
        }

        setup_parameter_panel(&document, &app, &config.wave);
        setup_background_input(&document, config.background_color);
        setup_orbit_input(&canvas, app.clone());
        setup_resize(&canvas, app.clone());

        request_animation_frame(app);

        log::info!("Wave Tiles running!");
    }

    /// Bind a range input to one wave channel
    fn bind_slider(
        document: &web_sys::Document,
        app: &Rc<RefCell<App>>,
        id: &str,
        range: std::ops::RangeInclusive<f32>,
        initial: f32,
        set: fn(&mut WaveParams, f32),
    ) {
        let Some(input) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            log::warn!("No #{} slider, channel stays at {}", id, initial);
            return;
        };
        input.set_min(&range.start().to_string());
        input.set_max(&range.end().to_string());
        input.set_step("any");
        input.set_value_as_number(initial as f64);

        let app = app.clone();
        let source = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let value = source.value_as_number() as f32;
            set(&mut app.borrow_mut().sim.params, value);
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_parameter_panel(
        document: &web_sys::Document,
        app: &Rc<RefCell<App>>,
        initial: &WaveParams,
    ) {
        bind_slider(
            document,
            app,
            "wave-length",
            WAVE_LENGTH_RANGE,
            initial.wave_length(),
            WaveParams::set_wave_length,
        );
        bind_slider(
            document,
            app,
            "amplitude",
            AMPLITUDE_RANGE,
            initial.amplitude(),
            WaveParams::set_amplitude,
        );
        bind_slider(
            document,
            app,
            "velocity",
            VELOCITY_RANGE,
            initial.velocity(),
            WaveParams::set_velocity,
        );
    }

    fn setup_background_input(document: &web_sys::Document, initial: Color) {
        let Some(input) = document
            .get_element_by_id("background-color")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        input.set_value(&initial.to_hex());

        let doc = document.clone();
        let source = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            match Color::from_hex(&source.value()) {
                Ok(color) => apply_background(&doc, color),
                Err(e) => log::warn!("{}", e),
            }
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_orbit_input(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer down - start rotating
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                app.borrow_mut()
                    .presenter
                    .controls
                    .pointer_down(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move - rotate while held
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let height = canvas_clone.client_height() as f32;
                app.borrow_mut().presenter.controls.pointer_move(
                    event.offset_x() as f32,
                    event.offset_y() as f32,
                    height,
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up / cancel - stop rotating
        for kind in ["pointerup", "pointercancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().presenter.controls.pointer_up();
            });
            let _ = canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel - dolly
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                app.borrow_mut().presenter.controls.wheel(event.delta_y() as f32);
            });
            let _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let canvas = canvas.clone();
        let win = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = canvas_pixel_size(&win, &canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            app.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            animation_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn animation_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use wave_tiles::SceneConfig;
    use wave_tiles::scene::{self, Scene};
    use wave_tiles::sim::{AnimationDriver, FrameHost, SimulationState};

    /// Synthetic display refresh rate (Hz)
    const REFRESH_HZ: f64 = 144.0;
    const RUN_SECONDS: f64 = 2.0;

    /// Keeps the scene in sync without drawing it
    struct HeadlessHost {
        scene: Scene,
        renders: u64,
    }

    impl FrameHost for HeadlessHost {
        fn update_controls(&mut self) {}

        fn render(&mut self, state: &SimulationState) {
            self.scene.sync_spheres(&state.spheres);
            self.renders += 1;
        }
    }

    fn load_config() -> SceneConfig {
        let Some(path) = std::env::args().nth(1) else {
            return SceneConfig::load();
        };
        match SceneConfig::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded scene config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Ignoring scene config {}: {}", path, e);
                SceneConfig::default()
            }
        }
    }

    pub fn run() {
        let config = load_config();
        let (scene, mut sim) = scene::build(&config);
        let mut driver = AnimationDriver::new(config.target_fps);
        let mut host = HeadlessHost { scene, renders: 0 };

        let frame_ms = 1000.0 / REFRESH_HZ;
        let frames = (RUN_SECONDS * REFRESH_HZ) as u64;
        for i in 0..=frames {
            driver.frame(i as f64 * frame_ms, &mut sim, &mut host);
        }

        log::info!(
            "{} refreshes at {}Hz, {} rendered, {} simulation steps, phase {:.3}",
            driver.frames(),
            REFRESH_HZ,
            host.renders,
            driver.steps(),
            sim.wave.phase()
        );
        for sphere in sim.spheres.iter() {
            log::info!(
                "sphere at ({:>5.1}, {:>4.1}) y = {:>6.3}",
                sphere.position.x,
                sphere.position.z,
                sphere.position.y
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Wave Tiles (native) starting...");
    log::info!("Rendering needs WebGPU in a browser - run with `trunk serve` for the web version");

    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
