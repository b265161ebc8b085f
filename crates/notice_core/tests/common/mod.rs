#![allow(dead_code)]

pub const POWER_REACTOR_RECORD: &str = r#"<a name="en53949"></a>
<table>
<tr>
<td>Power Reactor</td>
<td>Event Number: 53949</td>
</tr>
<tr>
<td>Facility: PEACH BOTTOM<BR>Region: 1 State: PA<BR>Unit: [2] [3] []<BR>RX Type: [2] GE-4<BR>NRC Notified By: JOHN SMITH<BR>HQ OPS Officer: JEFF HERRERA</td>
<td>Notification Date: 03/26/2019<BR>Notification Time: 04:12 [ET]<BR>Event Date: 03/25/2019<BR>Emergency Class: NON EMERGENCY<BR>10 CFR Section:<BR>50.72(b)(3)(iv)(A) - VALID SPECIF SYS ACTUATION<BR>50.72(b)(2)(iv)(B) - RPS ACTUATION - CRITICAL</td>
<td>Person (Organization):<BR>JANE ROE (R1DO)</td>
</tr>
</table>
<table>
<tr>
<td>Unit</td>
<td>SCRAM Code</td>
<td>RX CRIT</td>
<td>Initial PWR</td>
<td>Initial RX Mode</td>
<td>Current PWR</td>
<td>Current RX Mode</td>
</tr>
<tr>
<td>2</td>
<td>A/R</td>
<td>Y</td>
<td>100</td>
<td>Power Operation</td>
<td>0</td>
<td>Hot Standby</td>
</tr>
<tr>
<td>3</td>
<td>N</td>
<td>Y</td>
<td>100</td>
<td>Power Operation</td>
</tr>
</table>
<table>
<tr>
<td>Event Text<BR>AUTOMATIC REACTOR SCRAM<BR>Unit 2 tripped on low condenser vacuum.</td>
</tr>
</table>
"#;

/// Same shape as a power reactor record, written without whitespace between tags.
pub const COMPACT_POWER_REACTOR_RECORD: &str = concat!(
    r#"<a name="en53960"></a><table><tr><td>Power Reactor</td><td>Event Number: 53960</td></tr>"#,
    r#"<tr><td>Facility: HATCH<BR>State: GA<BR>Unit: [1] [] []</td>"#,
    r#"<td>10 CFR Section:<BR>50.72(b)(2)(iv)(B) - RPS ACTUATION - CRITICAL</td>"#,
    r#"<td>Person (Organization):<BR>MARK LANE (R2DO)</td></tr></table>"#,
    r#"<table><tr><td>Unit</td><td>SCRAM Code</td><td>RX CRIT</td><td>Initial PWR</td>"#,
    r#"<td>Initial RX Mode</td><td>Current PWR</td><td>Current RX Mode</td></tr>"#,
    r#"<tr><td>1</td><td>M/R</td><td>Y</td><td>90</td><td>Power Operation</td><td>0</td><td>Hot Shutdown</td></tr></table>"#,
    r#"<table><tr><td>Event Text<BR>Manual scram after feedwater loss.</td></tr></table>"#,
);

pub const AGREEMENT_STATE_RECORD: &str = r#"<a name="en53950"></a>
<table>
<tr>
<td>Agreement State<BR>Event Number: 53950</td>
</tr>
<tr>
<td>!!!!! THIS EVENT HAS BEEN RETRACTED.  THIS EVENT HAS BEEN RETRACTED !!!!!</td>
</tr>
<tr>
<td>Rep Org: TEXAS DEPT OF STATE HEALTH SERVICES<BR>Licensee: ACME INSPECTION<BR>City: HOUSTON  State: TX<BR>License #: 12345<BR>Comments: LOST GAUGE<BR>REPORTED BY LICENSEE<BR>Emergency Class: NON EMERGENCY<BR>10 CFR Section:<BR>AGREEMENT STATE<BR>30.50(b)(4) - FIRE/EXPLOSION - SEE NOTE<BR>BOGUS 99.99 CITATION<BR>Person (Organization):<BR>RAY KELLAR (R4DO)<BR>ILTAB (EMAIL) ()<BR>This material event contains a "Category 3" level of radioactive material.</td>
</tr>
<tr>
<td>Event Text<BR>The following was received from the State via email.<BR>A moisture density gauge was lost.</td>
</tr>
</table>
"#;

/// Last record of a feed page: the CFR block was cut off.
pub const TRUNCATED_RECORD: &str = r#"<a name="en53951"></a>
<table>
<tr>
<td>Fuel Cycle Facility<BR>Event Number: 53951<BR>Person (Organization):<BR>SAM LEE (NMSS)</td>
</tr>
<tr>
<td>Event Text<BR>Page Last Reviewed/Updated Tuesday, March 26, 2019</td>
</tr>
</table>
"#;

pub fn digest_page(records: &[&str]) -> String {
    format!(
        r#"<html><head><title>Event Notification Report for March 26, 2019</title></head>
<body>
<div id="header">Event Notification Report for March 26, 2019</div>
<div id="mainSubFull">
<h2>Headline</h2>
{}
</div>
<div id="footer">Page Last Reviewed/Updated Tuesday, March 26, 2019</div>
</body></html>"#,
        records.join("\n")
    )
}
