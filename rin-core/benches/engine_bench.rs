use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use rin_core::{InputEvent, OutputEvent, ScriptEngine};
use rin_script::ScriptEntry;

fn make_script(lines: usize) -> Vec<ScriptEntry> {
    let mut buf = String::with_capacity(lines * 64);
    buf.push('[');
    buf.push_str(r#"{"type":"phase","name":"Start","background":"bg0.png","bgm":"theme.mp3"}"#);
    for i in 0..lines {
        buf.push(',');
        match i % 8 {
            0 => buf.push_str(&format!(r#"{{"type":"scene","background":"bg{i}.png"}}"#)),
            1 => buf.push_str(&format!(r#"{{"type":"dialogue","text":"line {i}","speaker":"ch1"}}"#)),
            2 => buf.push_str(&format!(r#"{{"type":"dialogue","text":"line {i}"}}"#)),
            3 => buf.push_str(&format!(r#"{{"type":"label","name":"l{i}"}}"#)),
            4 => buf.push_str(&format!(
                r#"{{"type":"choice","options":[{{"text":"a","jump":"l{}"}},{{"text":"b"}}]}}"#,
                i + 2
            )),
            5 => buf.push_str(&format!(r#"{{"type":"dialogue","text":"line {i}","speaker":"ch2"}}"#)),
            6 => buf.push_str(&format!(r#"{{"type":"label","name":"l{i}"}}"#)),
            7 => buf.push_str(&format!(
                r#"{{"type":"scene","background":"fx{i}.png","persistBackground":false,"transitionOut":"fadeout"}}"#
            )),
            _ => unreachable!(),
        }
    }
    buf.push(']');
    rin_script::parse_script(&buf).expect("bench script parses")
}

fn run_to_end(mut engine: ScriptEngine) {
    engine.feed(InputEvent::Ready);
    loop {
        let events = engine.drain_events();
        if events.is_empty() {
            break;
        }
        let mut done = false;
        for ev in events {
            match ev {
                OutputEvent::Display(payload) => {
                    if payload.options.is_empty() {
                        engine.feed(InputEvent::RequestNext);
                    } else {
                        engine.feed(InputEvent::ChoiceMade(payload.options[0].clone()));
                    }
                }
                OutputEvent::ExecuteTransition { .. } => engine.feed(InputEvent::RequestNext),
                OutputEvent::EndOfChapter { .. } | OutputEvent::PreviewFinished(_) => done = true,
            }
        }
        if done {
            break;
        }
    }
}

static INIT: std::sync::Once = std::sync::Once::new();

fn bench_engine(c: &mut Criterion) {
    const LINES: usize = 10_000;
    let mut group = c.benchmark_group("engine");
    group.sample_size(10);

    group.bench_function("walk 10k entries", |b| {
        INIT.call_once(rin_shared::config::init_empty);
        b.iter_batched(
            || make_script(LINES),
            |script| run_to_end(ScriptEngine::new(script, "", "", None)),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
