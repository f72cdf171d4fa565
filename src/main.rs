//! Heart Caplets entry point
//!
//! On web, wires the page to the timeline and runs the frame loop.
//! Natively, plays one seeded show headless and logs what the page would do.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_show {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlButtonElement, HtmlElement, KeyboardEvent, MouseEvent};

    use heart_caplets::consts::MAX_FRAME_MS;
    use heart_caplets::sim::{Caplet, CapletState, Glow, ShowEvent, Spark, Timeline, Viewport};
    use heart_caplets::{Point, Settings};

    const SOFT_GLOW: &str = "drop-shadow(0 0 12px rgba(236, 72, 153, 0.8))";
    const FINAL_GLOW: &str =
        "drop-shadow(0 0 15px rgba(236, 72, 153, 1)) drop-shadow(0 0 25px rgba(168, 85, 247, 0.5))";

    /// Page handles plus the timeline driving them
    struct Show {
        timeline: Timeline,
        document: Document,
        caplet_els: Vec<HtmlElement>,
        burst_els: Vec<(u32, HtmlElement)>,
        sparkle_els: Vec<(u32, HtmlElement)>,
        /// Letter spans waiting one frame before fading in
        letters_pending: bool,
        last_time: f64,
    }

    fn window_viewport() -> Viewport {
        let window = web_sys::window().expect("no window");
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(w as f32, h as f32)
    }

    fn by_id(document: &Document, id: &str) -> Option<HtmlElement> {
        let el = document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok();
        if el.is_none() {
            log::warn!("Missing element #{id}");
        }
        el
    }

    fn by_selector(document: &Document, selector: &str) -> Option<HtmlElement> {
        document
            .query_selector(selector)
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn style(el: &HtmlElement, prop: &str, value: &str) {
        let _ = el.style().set_property(prop, value);
    }

    fn set_class(el: &HtmlElement, class: &str, on: bool) {
        let list = el.class_list();
        let _ = if on { list.add_1(class) } else { list.remove_1(class) };
    }

    fn new_div(document: &Document) -> Option<HtmlElement> {
        document.create_element("div").ok()?.dyn_into::<HtmlElement>().ok()
    }

    fn place_caplet(el: &HtmlElement, caplet: &Caplet) {
        let pos = caplet.position();
        style(el, "left", &format!("{}px", pos.x));
        style(el, "top", &format!("{}px", pos.y));
        style(
            el,
            "transform",
            &format!("rotate({}deg) scale({})", caplet.rotation_deg, caplet.scale()),
        );
        set_class(el, "animated", caplet.state != CapletState::AtStart);
        glow_caplet(el, caplet.glow);
    }

    fn glow_caplet(el: &HtmlElement, glow: Glow) {
        let filter = match glow {
            Glow::None => "none",
            Glow::Soft => SOFT_GLOW,
            Glow::Final => FINAL_GLOW,
        };
        style(el, "filter", filter);
    }

    impl Show {
        fn new(timeline: Timeline, document: Document) -> Self {
            let mut show = Self {
                timeline,
                document,
                caplet_els: Vec::new(),
                burst_els: Vec::new(),
                sparkle_els: Vec::new(),
                letters_pending: false,
                last_time: 0.0,
            };
            show.create_caplets();
            show.create_particles();
            show
        }

        fn create_caplets(&mut self) {
            let Some(container) = by_id(&self.document, "capletsContainer") else {
                return;
            };
            for caplet in self.timeline.caplets() {
                let Some(el) = new_div(&self.document) else {
                    continue;
                };
                el.set_class_name("caplet");
                style(&el, "transition-delay", &format!("{}ms", caplet.delay_ms));
                place_caplet(&el, caplet);
                let _ = container.append_child(&el);
                self.caplet_els.push(el);
            }
        }

        fn create_particles(&self) {
            let Some(container) = by_id(&self.document, "particles") else {
                return;
            };
            for p in self.timeline.ambient() {
                let Some(el) = new_div(&self.document) else {
                    continue;
                };
                el.set_class_name("particle");
                style(&el, "left", &format!("{}%", p.pos_pct.x));
                style(&el, "top", &format!("{}%", p.pos_pct.y));
                style(&el, "animation-delay", &format!("{}s", p.delay_s));
                style(&el, "animation-duration", &format!("{}s", p.duration_s));
                let _ = container.append_child(&el);
            }
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).min(MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;

            if self.letters_pending {
                self.fade_in_letters();
            }

            self.timeline.advance(dt);
            for event in self.timeline.drain_events() {
                self.apply(event);
            }
            self.sync_stage();
            self.sync_sparks();
        }

        fn apply(&mut self, event: ShowEvent) {
            match event {
                ShowEvent::CapletLaunched { id, .. }
                | ShowEvent::CapletArrived { id }
                | ShowEvent::CapletGlow { id, .. } => {
                    let idx = id as usize;
                    if let (Some(el), Some(caplet)) =
                        (self.caplet_els.get(idx), self.timeline.caplets().get(idx))
                    {
                        place_caplet(el, caplet);
                    }
                }
                ShowEvent::TextRevealed => self.build_letters(),
                ShowEvent::SubtitleRevealed => {
                    if let Some(sub) = by_selector(&self.document, "#textContainer .subtitle") {
                        style(&sub, "transition", "all 0.8s ease");
                        style(&sub, "opacity", "1");
                        style(&sub, "transform", "translateY(0)");
                    }
                }
                ShowEvent::Reset { .. } => {
                    self.restore_text();
                    self.place_all();
                }
                ShowEvent::Resized => self.place_all(),
                ShowEvent::RunComplete => log::info!("Show complete"),
                _ => {}
            }
        }

        fn place_all(&self) {
            for (el, caplet) in self.caplet_els.iter().zip(self.timeline.caplets()) {
                place_caplet(el, caplet);
            }
        }

        fn build_letters(&mut self) {
            let Some(main) = by_selector(&self.document, "#textContainer .main-text") else {
                return;
            };
            main.set_inner_html("");
            for letter in &self.timeline.stage().letters {
                let Some(span) = self
                    .document
                    .create_element("span")
                    .ok()
                    .and_then(|e| e.dyn_into::<HtmlElement>().ok())
                else {
                    continue;
                };
                span.set_text_content(Some(&letter.ch.to_string()));
                style(&span, "display", "inline-block");
                style(&span, "opacity", "0");
                style(&span, "transform", "translateY(20px)");
                style(&span, "transition", "all 0.5s ease");
                style(&span, "transition-delay", &format!("{}ms", letter.delay_ms));
                let _ = main.append_child(&span);
            }
            if let Some(sub) = by_selector(&self.document, "#textContainer .subtitle") {
                style(&sub, "opacity", "0");
                style(&sub, "transform", "translateY(10px)");
            }
            self.letters_pending = true;
        }

        fn fade_in_letters(&mut self) {
            self.letters_pending = false;
            let Ok(spans) = self.document.query_selector_all("#textContainer .main-text span")
            else {
                return;
            };
            for i in 0..spans.length() {
                if let Some(span) = spans.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
                    style(&span, "opacity", "1");
                    style(&span, "transform", "translateY(0)");
                }
            }
        }

        fn restore_text(&mut self) {
            self.letters_pending = false;
            if let Some(main) = by_selector(&self.document, "#textContainer .main-text") {
                main.set_text_content(Some(&self.timeline.settings().text));
            }
            if let Some(sub) = by_selector(&self.document, "#textContainer .subtitle") {
                style(&sub, "opacity", "");
                style(&sub, "transform", "");
                style(&sub, "transition", "");
            }
        }

        /// Mirror stage flags into classes
        fn sync_stage(&self) {
            let stage = self.timeline.stage();
            if let Some(el) = by_id(&self.document, "textContainer") {
                set_class(&el, "visible", stage.text_visible);
            }
            if let Some(el) = by_id(&self.document, "heartGlow") {
                set_class(&el, "active", stage.heart_glow);
            }
            if let Some(el) = by_id(&self.document, "progressContainer") {
                set_class(&el, "visible", stage.progress_visible);
            }
            if let Some(el) = by_id(&self.document, "progressBar") {
                set_class(&el, "active", stage.progress_active);
            }
            if let Some(btn) = self
                .document
                .get_element_by_id("startBtn")
                .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
            {
                btn.set_disabled(!stage.start_enabled);
            }
        }

        /// Create, move and remove burst/sparkle elements to match the stage
        fn sync_sparks(&mut self) {
            let stage = self.timeline.stage();
            sync_spark_els(&self.document, &mut self.burst_els, &stage.bursts, "burst");
            sync_spark_els(&self.document, &mut self.sparkle_els, &stage.sparkles, "sparkle");
        }
    }

    fn sync_spark_els(
        document: &Document,
        els: &mut Vec<(u32, HtmlElement)>,
        sparks: &[Spark],
        class: &str,
    ) {
        els.retain(|(id, el)| {
            let alive = sparks.iter().any(|s| s.id == *id);
            if !alive {
                el.remove();
            }
            alive
        });
        let Some(body) = document.body() else {
            return;
        };
        for spark in sparks {
            let el = match els.iter().find(|(id, _)| *id == spark.id) {
                Some((_, el)) => el.clone(),
                None => {
                    let Some(el) = new_div(document) else {
                        continue;
                    };
                    el.set_class_name(class);
                    let _ = body.append_child(&el);
                    els.push((spark.id, el.clone()));
                    el
                }
            };
            let pos = spark.pos();
            style(&el, "left", &format!("{}px", pos.x));
            style(&el, "top", &format!("{}px", pos.y));
            style(&el, "opacity", &format!("{}", spark.opacity()));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Heart Caplets starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let timeline = match Timeline::new(settings, window_viewport(), seed) {
            Ok(t) => t,
            Err(e) => {
                log::error!("Cannot build timeline: {e}");
                return;
            }
        };
        log::info!("Timeline seeded with {}", seed);

        let show = Rc::new(RefCell::new(Show::new(timeline, document)));
        setup_buttons(show.clone());
        setup_input_handlers(show.clone());
        sync_audio_icon(&show.borrow());
        request_animation_frame(show);

        log::info!("Heart Caplets running!");
    }

    fn on_click(el: &HtmlElement, show: Rc<RefCell<Show>>, f: fn(&mut Show)) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            f(&mut show.borrow_mut());
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn begin(show: &mut Show) {
        show.timeline.begin();
    }

    fn reset(show: &mut Show) {
        show.timeline.reset();
        // The window may have changed size while the run ignored resizes
        if let Err(e) = show.timeline.on_resize(window_viewport()) {
            log::warn!("Resize after reset failed: {e}");
        }
    }

    fn toggle_audio(show: &mut Show) {
        show.timeline.preferences_mut().toggle_muted();
        show.timeline.settings().save();
        sync_audio_icon(show);
    }

    fn sync_audio_icon(show: &Show) {
        if let Some(btn) = by_id(&show.document, "audioBtn") {
            let icon = if show.timeline.settings().muted { "🔇" } else { "🔊" };
            btn.set_text_content(Some(icon));
        }
    }

    fn setup_buttons(show: Rc<RefCell<Show>>) {
        let document = show.borrow().document.clone();
        if let Some(btn) = by_id(&document, "startBtn") {
            on_click(&btn, show.clone(), begin);
        }
        if let Some(btn) = by_id(&document, "resetBtn") {
            on_click(&btn, show.clone(), reset);
        }
        if let Some(btn) = by_id(&document, "audioBtn") {
            on_click(&btn, show, toggle_audio);
        }
    }

    fn setup_input_handlers(show: Rc<RefCell<Show>>) {
        let window = web_sys::window().expect("no window");
        let document = show.borrow().document.clone();

        // Space toggles begin/reset
        {
            let show = show.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() != "Space" {
                    return;
                }
                event.prevent_default();
                let mut s = show.borrow_mut();
                if s.timeline.is_running() {
                    reset(&mut s);
                } else {
                    begin(&mut s);
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize (ignored by the timeline while running)
        {
            let show = show.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut s = show.borrow_mut();
                if let Err(e) = s.timeline.on_resize(window_viewport()) {
                    log::warn!("Resize rejected: {e}");
                }
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer parallax on the aurora and floating rings
        {
            let show = show.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let s = show.borrow();
                let pointer = Point::new(event.client_x() as f32, event.client_y() as f32);
                let Ok(rings) = s.document.query_selector_all(".floating-ring") else {
                    return;
                };
                let p = heart_caplets::sim::parallax(
                    pointer,
                    s.timeline.viewport(),
                    rings.length() as usize,
                );
                if let Some(aurora) = by_selector(&s.document, ".aurora-effect") {
                    style(
                        &aurora,
                        "transform",
                        &format!("translate(-50%, -50%) rotate({}deg)", p.aurora_deg),
                    );
                }
                for (i, offset) in p.rings.iter().enumerate() {
                    if let Some(ring) = rings
                        .item(i as u32)
                        .and_then(|n| n.dyn_into::<HtmlElement>().ok())
                    {
                        style(
                            &ring,
                            "transform",
                            &format!("translate({}px, {}px)", offset.x, offset.y),
                        );
                    }
                }
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click anywhere: sparkle
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let at = Point::new(event.client_x() as f32, event.client_y() as f32);
                show.borrow_mut().timeline.sparkle_at(at);
            });
            let _ = document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(show: Rc<RefCell<Show>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            show.borrow_mut().frame(time);
            request_animation_frame(show);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_show::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Heart Caplets (native) starting...");
    log::info!("Native mode plays one headless show - run with `trunk serve` for the web version");

    if let Err(e) = headless_show() {
        log::error!("Headless show failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one seeded show at 60 fps and summarize its events
#[cfg(not(target_arch = "wasm32"))]
fn headless_show() -> heart_caplets::Result<()> {
    use heart_caplets::Settings;
    use heart_caplets::sim::{RunPhase, ShowEvent, Timeline, Viewport};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    let mut timeline = Timeline::new(Settings::load(), Viewport::new(1280.0, 720.0), 2024)?;
    timeline.begin();

    let mut frames = 0u32;
    let mut launched = 0usize;
    while timeline.phase() != RunPhase::Complete || timeline.pending_timers() > 0 {
        timeline.advance(FRAME_MS);
        frames += 1;
        for event in timeline.drain_events() {
            match event {
                ShowEvent::CapletLaunched { .. } => launched += 1,
                ShowEvent::MilestoneFired { name } => {
                    log::info!("{:>7.1}ms  milestone {}", timeline.now_ms(), name)
                }
                ShowEvent::RunComplete => log::info!("{:>7.1}ms  complete", timeline.now_ms()),
                _ => {}
            }
        }
    }

    println!(
        "Show finished after {} frames ({:.0}ms): {} caplets launched, {} on the heart",
        frames,
        timeline.now_ms(),
        launched,
        timeline
            .caplets()
            .iter()
            .filter(|c| c.state == heart_caplets::sim::CapletState::AtTarget)
            .count()
    );

    timeline.reset();
    println!("Reset cancelled {} timers", count_cancelled(&mut timeline));
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn count_cancelled(timeline: &mut heart_caplets::sim::Timeline) -> usize {
    timeline
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            heart_caplets::sim::ShowEvent::Reset { cancelled } => Some(cancelled),
            _ => None,
        })
        .unwrap_or(0)
}
