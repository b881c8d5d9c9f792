mod support;

use output_events::{CollectedEvents, EofEvent, OutputFilter, VerboseFilter};
use support::{chunks_of, summary};

fn run_plain<I, S>(chunks: I) -> CollectedEvents
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut filter = VerboseFilter::new(CollectedEvents::default());
    for chunk in chunks {
        filter.write(chunk.as_ref());
    }
    filter.close();
    filter.into_sink()
}

#[test]
fn one_event_per_line_with_line_ranges() {
    let events = run_plain(["Identity added: /tmp/key\nRunning inventory ", "update\n\ndone"]);
    let records: Vec<_> = events.records().map(summary).collect();
    assert_eq!(
        records,
        vec![
            (1, "Identity added: /tmp/key\n".to_string(), 0, 1),
            (2, "Running inventory update\n".to_string(), 1, 2),
            (3, "\n".to_string(), 2, 3),
            (4, "done".to_string(), 3, 3),
        ]
    );
    assert_eq!(events.eof(), Some(EofEvent { final_counter: 4 }));
}

#[test]
fn chunking_does_not_change_events() {
    let text = "alpha\r\nbeta\n\ngamma \u{03b3}\n10%\r55%\r\x0cpage\u{2028}x\nno newline";
    let whole = run_plain([text]);
    for size in 1..=6 {
        assert_eq!(run_plain(chunks_of(text, size)), whole, "chunk size {size}");
    }
}

#[test]
fn progress_output_splits_at_carriage_returns() {
    let events = run_plain(["a\rb\n", "50%\r100%\rdone\n"]);
    let records: Vec<_> = events.records().map(summary).collect();
    assert_eq!(
        records,
        vec![
            (1, "a\r".to_string(), 0, 0),
            (2, "b\n".to_string(), 0, 1),
            (3, "50%\r".to_string(), 1, 1),
            (4, "100%\r".to_string(), 1, 1),
            (5, "done\n".to_string(), 1, 2),
        ]
    );
}

#[test]
fn works_behind_the_trait() {
    fn drive(filter: &mut dyn OutputFilter) {
        filter.write("x\ny");
        filter.close();
    }

    let mut filter = VerboseFilter::new(CollectedEvents::default());
    drive(&mut filter);
    assert_eq!(filter.counter(), 2);
    assert_eq!(filter.sink().eof(), Some(EofEvent { final_counter: 2 }));
}
