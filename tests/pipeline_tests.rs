//! End-to-end pipeline tests: frame loop, reticle, selection and placement
//! driven through the scripted host.

#[cfg(test)]
mod tests {
    use critter_ar::{
        replay::{self, ScriptEvent, ScriptFrame, ScriptedSession, SessionScript},
        AnimalKind, AppConfig, ArApp, ModelRegistry, NullRenderer, Pose, Prototype, Renderer,
        Reticle, Scene,
    };
    use glam::{Quat, Vec3};

    /// Records what the renderer was handed each frame.
    #[derive(Default)]
    struct Recorder {
        frames: Vec<(bool, Pose, usize)>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, scene: &Scene, reticle: &Reticle) {
            self.frames.push((reticle.visible, reticle.pose, scene.len()));
        }
    }

    fn pose(i: usize) -> Pose {
        Pose::from_translation_rotation(
            Vec3::new(i as f32 * 0.1, -1.2, -0.6 - i as f32 * 0.05),
            Quat::from_rotation_y(i as f32 * 0.3),
        )
    }

    fn make_app() -> ArApp<ScriptedSession> {
        ArApp::new(&AppConfig::default())
    }

    fn run(app: &mut ArApp<ScriptedSession>, script: &SessionScript) -> (ScriptedSession, Recorder) {
        let mut session = ScriptedSession::for_script(script);
        let mut rec = Recorder::default();
        replay::run_script(app, &mut session, script, &mut rec);
        (session, rec)
    }

    // -----------------------------------------------------------------------
    // Reticle follows the surface
    // -----------------------------------------------------------------------

    #[test]
    fn reticle_visibility_tracks_surface_every_frame() {
        let pattern = [true, true, false, true, false, false, true];
        let mut frames = vec![ScriptFrame::with_hits(vec![])]; // feed pending
        for (i, found) in pattern.iter().enumerate() {
            let hits = if *found { vec![pose(i)] } else { vec![] };
            frames.push(ScriptFrame::with_hits(hits));
        }
        let mut app = make_app();
        let (_, rec) = run(&mut app, &SessionScript::new(frames));

        assert!(!rec.frames[0].0);
        for (i, found) in pattern.iter().enumerate() {
            let (visible, shown, _) = rec.frames[i + 1];
            assert_eq!(visible, *found, "frame {}", i + 1);
            if *found {
                assert_eq!(shown.matrix, pose(i).matrix);
            }
        }
    }

    #[test]
    fn reticle_pose_is_not_smoothed() {
        let jitter = [
            Pose::from_matrix([1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.1, -1.0, -0.5, 1.0]),
            Pose::from_matrix([1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.9, -1.0, -0.5, 1.0]),
        ];
        let script = SessionScript {
            feed_latency_frames: 0,
            refuse_feed: None,
            frames: vec![
                ScriptFrame::with_hits(vec![jitter[0]]),
                ScriptFrame::with_hits(vec![jitter[1]]),
            ],
        };
        let mut app = make_app();
        let (_, rec) = run(&mut app, &script);
        assert_eq!(rec.frames[0].1, jitter[0]);
        assert_eq!(rec.frames[1].1, jitter[1]);
    }

    #[test]
    fn untracked_frames_still_render() {
        let script = SessionScript::new(vec![
            ScriptFrame::untracked(),
            ScriptFrame::untracked(),
            ScriptFrame::with_hits(vec![pose(0)]),
        ]);
        let mut app = make_app();
        let (session, rec) = run(&mut app, &script);
        assert_eq!(rec.frames.len(), 3);
        assert_eq!(session.requests(), 1);
        assert_eq!(app.stats().frames, 3);
    }

    // -----------------------------------------------------------------------
    // Placement preconditions
    // -----------------------------------------------------------------------

    #[test]
    fn no_surface_means_no_placements() {
        let frames = (0..20)
            .map(|_| ScriptFrame::with_hits(vec![]).then(ScriptEvent::Select))
            .collect();
        let mut app = make_app();
        run(&mut app, &SessionScript::new(frames));
        assert!(app.scene().is_empty());
        assert_eq!(app.stats().rejected_placements, 20);
    }

    #[test]
    fn refused_feed_never_places() {
        let frames = (0..5)
            .map(|i| ScriptFrame::with_hits(vec![pose(i)]).then(ScriptEvent::Select))
            .collect();
        let script = SessionScript {
            feed_latency_frames: 0,
            refuse_feed: Some("denied".into()),
            frames,
        };
        let mut app = make_app();
        let (_, rec) = run(&mut app, &script);
        assert!(app.scene().is_empty());
        assert!(rec.frames.iter().all(|(visible, _, _)| !visible));
    }

    #[test]
    fn missing_prototype_places_nothing_until_installed() {
        let mut app: ArApp<ScriptedSession> =
            ArApp::with_parts(ModelRegistry::new(AnimalKind::Bird), Scene::new());
        let mut session = ScriptedSession::new(0, None);
        let mut r = NullRenderer::default();

        let frame = ScriptFrame::with_hits(vec![pose(1)]);
        replay::step(&mut app, &mut session, &frame.clone().then(ScriptEvent::Select), &mut r);
        assert!(app.scene().is_empty());

        app.install_prototype(Prototype::procedural(AnimalKind::Bird));
        replay::step(&mut app, &mut session, &frame.then(ScriptEvent::Select), &mut r);
        assert_eq!(app.scene().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn select_on_detection_frame_places_at_that_pose() {
        let p = pose(10);
        let mut frames: Vec<_> = (0..9).map(|_| ScriptFrame::with_hits(vec![])).collect();
        frames.push(ScriptFrame::with_hits(vec![p]).then(ScriptEvent::Select));

        let mut app = make_app();
        run(&mut app, &SessionScript::new(frames));

        let placed: Vec<_> = app.scene().instances().collect();
        assert_eq!(placed.len(), 1);
        assert!((placed[0].position - p.translation()).length() < 1e-6);
        assert!(placed[0].orientation.dot(p.rotation()).abs() > 0.9999);
    }

    #[test]
    fn repeated_selects_place_independent_instances() {
        let mut frames = vec![ScriptFrame::with_hits(vec![])];
        for i in 1..=5 {
            frames.push(ScriptFrame::with_hits(vec![pose(i)]).then(ScriptEvent::Select));
        }
        let mut app = make_app();
        run(&mut app, &SessionScript::new(frames));

        let positions: Vec<_> = app.scene().instances().map(|i| i.position).collect();
        assert_eq!(positions.len(), 5);
        for (n, pos) in positions.iter().enumerate() {
            assert!((*pos - pose(n + 1).translation()).length() < 1e-6);
        }
    }

    #[test]
    fn later_selection_wins() {
        let script = SessionScript::new(vec![
            ScriptFrame::with_hits(vec![]),
            ScriptFrame::with_hits(vec![pose(0)])
                .then(ScriptEvent::SelectKind("rabbit".into()))
                .then(ScriptEvent::SelectKind("fox".into()))
                .then(ScriptEvent::Select),
        ]);
        let mut app = make_app();
        run(&mut app, &script);
        let kinds: Vec<_> = app.scene().instances().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![AnimalKind::Fox]);
    }

    #[test]
    fn unknown_selection_is_ignored() {
        let script = SessionScript::new(vec![
            ScriptFrame::with_hits(vec![]),
            ScriptFrame::with_hits(vec![pose(0)])
                .then(ScriptEvent::SelectKind("bird".into()))
                .then(ScriptEvent::SelectKind("nonexistent".into()))
                .then(ScriptEvent::Select),
        ]);
        let mut app = make_app();
        run(&mut app, &script);
        assert_eq!(app.registry().selected(), AnimalKind::Bird);
        assert_eq!(app.scene().instances().next().map(|i| i.kind), Some(AnimalKind::Bird));
    }

    #[test]
    fn instances_edit_independently() {
        let script = SessionScript::new(vec![
            ScriptFrame::with_hits(vec![]),
            ScriptFrame::with_hits(vec![pose(2)])
                .then(ScriptEvent::Select)
                .then(ScriptEvent::Select),
        ]);
        let mut app = make_app();
        run(&mut app, &script);

        let ids: Vec<_> = app.scene().instances().map(|i| i.id).collect();
        assert_eq!(ids.len(), 2);
        {
            let first = app.scene_mut().get_mut(ids[0]).unwrap();
            first.position += Vec3::new(5.0, 0.0, 0.0);
            first.orientation = Quat::from_rotation_z(1.0);
            first.parts[0].color = 0x00ff00;
        }
        let second = app.scene().get(ids[1]).unwrap();
        assert!((second.position - pose(2).translation()).length() < 1e-6);
        assert_ne!(second.parts[0].color, 0x00ff00);
        assert_eq!(
            app.registry().current_prototype().map(|p| p.parts[0].color),
            Some(Prototype::procedural(AnimalKind::Fox).parts[0].color)
        );
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn session_end_hides_reticle_and_rerequests_once() {
        let script = SessionScript::new(vec![
            ScriptFrame::with_hits(vec![]),
            ScriptFrame::with_hits(vec![pose(0)]).then(ScriptEvent::EndSession),
            ScriptFrame::untracked().then(ScriptEvent::Select),
            ScriptFrame::with_hits(vec![pose(1)]),
            ScriptFrame::with_hits(vec![pose(1)]),
            ScriptFrame::with_hits(vec![pose(1)]).then(ScriptEvent::Select),
        ]);
        let mut app = make_app();
        let (session, rec) = run(&mut app, &script);

        // rendered between sessions with the reticle hidden
        assert!(!rec.frames[2].0);
        assert_eq!(session.requests(), 2);
        assert_eq!(session.releases(), 1);
        assert_eq!(session.overlapping_requests(), 0);
        assert_eq!(session.stale_queries(), 0);
        assert_eq!(app.stats().feed_requests, 2);
        assert_eq!(app.scene().len(), 1);
    }

    #[test]
    fn instance_cap_evicts_oldest() {
        let cfg = AppConfig {
            max_instances: Some(3),
            ..AppConfig::default()
        };
        let mut app: ArApp<ScriptedSession> = ArApp::new(&cfg);
        let mut frames = vec![ScriptFrame::with_hits(vec![])];
        for i in 0..5 {
            frames.push(ScriptFrame::with_hits(vec![pose(i)]).then(ScriptEvent::Select));
        }
        run(&mut app, &SessionScript::new(frames));

        let stats = app.stats();
        assert_eq!(stats.placements, 5);
        assert_eq!(stats.live_instances, 3);
        let first = app.scene().instances().next().unwrap();
        assert!((first.position - pose(2).translation()).length() < 1e-6);
    }
}
