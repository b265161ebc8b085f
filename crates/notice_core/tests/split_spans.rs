use notice_core::split;
use pretty_assertions::assert_eq;

fn anchored_body(ids: &[&str], filler: &str) -> String {
    ids.iter()
        .map(|id| format!("<a name=\"en{id}\"></a>{filler} {id}\n"))
        .collect()
}

#[test]
fn n_anchors_make_n_contiguous_spans_covering_the_body() {
    for ids in [
        vec!["00001"],
        vec!["00001", "00002"],
        vec!["53949", "53950", "53951", "53952"],
    ] {
        let body = anchored_body(&ids, "record text");
        let split = split(&body);

        assert_eq!(split.spans.len(), ids.len());
        assert_eq!(split.preamble, 0..0);
        assert_eq!(split.spans[0].start, 0);
        for pair in split.spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(split.spans.last().unwrap().end, body.len());

        let rebuilt: String = split.spans.iter().map(|s| s.raw_text()).collect();
        assert_eq!(rebuilt, body);
        assert_eq!(split.record_ids(), ids);
    }
}

#[test]
fn preamble_precedes_first_span() {
    let body = format!("<h2>Report</h2>{}", anchored_body(&["12345", "23456"], "x"));
    let split = split(&body);
    assert_eq!(split.preamble, 0..15);
    assert_eq!(split.spans[0].start, 15);
    assert_eq!(&body[split.preamble.clone()], "<h2>Report</h2>");
}

#[test]
fn repeated_anchor_stays_inside_previous_span() {
    let body = "<a name=\"en00001\"></a>a<a name=\"en00002\"></a>b<a name=\"en00001\"></a>c";
    let split = split(body);
    assert_eq!(split.record_ids(), vec!["00001", "00002"]);
    assert_eq!(
        split.get("00002").unwrap().raw_text(),
        "<a name=\"en00002\"></a>b<a name=\"en00001\"></a>c"
    );
}
