use clipwatch::testing::mocks::CollectingDispatcher;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use clipwatch::{ClipEngine, EngineSettings, Frame, MotionFlag, RecordingState};

const NO: MotionFlag = MotionFlag::NoMotion;
const YES: MotionFlag = MotionFlag::Detected;

fn settings(pre_roll: usize, max_clip: usize) -> EngineSettings {
    EngineSettings {
        fps: 1.0,
        width: 2,
        height: 2,
        pre_roll_secs: pre_roll as f64,
        max_clip_secs: max_clip as f64,
    }
}

fn frame(seq: u64) -> Frame {
    Frame::new(seq, seq * 1_000, 2, 2, vec![seq as u8; 12])
}

fn seqs(frames: &[Frame]) -> Vec<u64> {
    frames.iter().map(|f| f.seq).collect()
}

#[test]
fn hand_traced_pre3_max5() {
    let dispatcher = CollectingDispatcher::new();
    let mut engine = ClipEngine::new(settings(3, 5), &dispatcher).unwrap();

    // (flag, ring after, pending after, state after, dispatched so far)
    let table: [(MotionFlag, [u64; 3], usize, RecordingState, usize); 8] = [
        (NO, [0, 0, 1], 0, RecordingState::Idle, 0),
        (NO, [0, 1, 2], 0, RecordingState::Idle, 0),
        (NO, [1, 2, 3], 0, RecordingState::Idle, 0),
        (YES, [2, 3, 4], 3, RecordingState::Recording, 0),
        (NO, [3, 4, 5], 4, RecordingState::Recording, 0),
        (NO, [4, 5, 6], 0, RecordingState::Idle, 1),
        (NO, [5, 6, 7], 0, RecordingState::Idle, 1),
        (NO, [6, 7, 8], 0, RecordingState::Idle, 1),
    ];

    for (i, (flag, ring, pending, state, dispatched)) in table.iter().enumerate() {
        let seq = i as u64 + 1;
        engine.ingest(frame(seq), *flag);

        assert_eq!(seqs(&engine.pre_roll_snapshot()), ring.to_vec(), "ring after f{}", seq);
        assert_eq!(engine.pending_frames(), *pending, "pending after f{}", seq);
        assert_eq!(engine.state(), *state, "state after f{}", seq);
        assert_eq!(dispatcher.len(), *dispatched, "dispatched after f{}", seq);
    }

    let jobs = dispatcher.jobs();
    assert_eq!(seqs(&jobs[0].frames), vec![2, 3, 4, 5, 6]);
}

#[test]
fn trigger_before_warm_up_is_padded_with_blanks() {
    let dispatcher = CollectingDispatcher::new();
    let mut engine = ClipEngine::new(settings(3, 4), &dispatcher).unwrap();

    engine.ingest(frame(1), YES);
    engine.ingest(frame(2), NO);

    let jobs = dispatcher.jobs();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].frames[0].is_blank());
    assert!(jobs[0].frames[1].is_blank());
    assert_eq!(seqs(&jobs[0].frames[2..]), vec![1, 2]);
}

#[test]
fn continuous_motion_cuts_at_max_and_restarts_next_frame() {
    let dispatcher = CollectingDispatcher::new();
    let mut engine = ClipEngine::new(settings(2, 4), &dispatcher).unwrap();

    for seq in 1..=8 {
        engine.ingest(frame(seq), YES);
    }

    let jobs = dispatcher.jobs();
    assert_eq!(jobs.len(), 2);
    // f1 triggers: [blank, 1] + 2, 3
    assert_eq!(seqs(&jobs[0].frames[1..]), vec![1, 2, 3]);
    // f4 triggers right after the cut: ring [3, 4] + 5, 6
    assert_eq!(seqs(&jobs[1].frames), vec![3, 4, 5, 6]);
    assert_eq!(engine.state(), RecordingState::Recording);
    assert_eq!(engine.pending_frames(), 3);
}

#[test]
fn no_frame_lost_or_duplicated_after_trigger() {
    let dispatcher = CollectingDispatcher::new();
    let mut engine = ClipEngine::new(settings(3, 10), &dispatcher).unwrap();

    for seq in 1..=5 {
        engine.ingest(frame(seq), NO);
    }
    engine.ingest(frame(6), YES);
    for seq in 7..=12 {
        engine.ingest(frame(seq), NO);
    }
    assert!(dispatcher.is_empty());
    assert_eq!(engine.pending_frames(), 9);

    engine.ingest(frame(13), NO);
    let jobs = dispatcher.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(seqs(&jobs[0].frames), (4..=13).collect::<Vec<u64>>());
}

#[test]
fn invariants_hold_for_arbitrary_flag_sequences() {
    for (pre, max, seed) in [(1, 1, 1u64), (1, 5, 2), (3, 5, 3), (4, 4, 4), (5, 30, 5), (10, 12, 6)] {
        let dispatcher = CollectingDispatcher::new();
        let mut engine = ClipEngine::new(settings(pre, max), &dispatcher).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut expected_prefixes: Vec<Vec<u64>> = Vec::new();
        let mut reached_max = 0usize;

        for seq in 1..=2_000u64 {
            let before = engine.state();
            let flag = MotionFlag::from(rng.gen_bool(0.07));
            let dispatched_before = dispatcher.len();

            engine.ingest(frame(seq), flag);

            if before == RecordingState::Idle && flag == YES {
                expected_prefixes.push(seqs(&engine.pre_roll_snapshot()));
            }

            match engine.state() {
                RecordingState::Idle => assert_eq!(engine.pending_frames(), 0),
                RecordingState::Recording => {
                    let n = engine.pending_frames();
                    assert!(n >= 1 && n < max, "pending {} outside 1..{}", n, max);
                }
            }

            if dispatcher.len() > dispatched_before {
                assert_eq!(dispatcher.len(), dispatched_before + 1);
                reached_max += 1;
            }
        }

        let jobs = dispatcher.jobs();
        assert_eq!(jobs.len(), reached_max);
        assert_eq!(engine.stats().clips_dispatched as usize, jobs.len());
        for (job, prefix) in jobs.iter().zip(expected_prefixes.iter()) {
            assert_eq!(job.len(), max);
            assert_eq!(&seqs(&job.frames[..pre]), prefix);

            // strictly increasing apart from leading blanks
            let real: Vec<u64> = seqs(&job.frames).into_iter().filter(|s| *s > 0).collect();
            assert!(real.windows(2).all(|w| w[1] == w[0] + 1), "gap or duplicate in {:?}", real);
        }
    }
}

#[test]
fn zero_fps_fails_construction() {
    let dispatcher = CollectingDispatcher::new();
    let mut s = settings(1, 2);
    s.fps = 0.0;
    assert!(ClipEngine::new(s, &dispatcher).is_err());
}
