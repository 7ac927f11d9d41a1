use std::fs;
use std::path::PathBuf;

use squad_terminal::answer::{
    AnswerNode, AnswerView, Inline, PlayerRecord, parse_detail_line, parse_inline_markup,
    parse_squad_answer, render, render_text,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn pair(label: &str, value: &str) -> (String, String) {
    (label.to_string(), value.to_string())
}

#[test]
fn full_squad_fixture_renders_one_card_per_block() {
    let raw = read_fixture("full_squad_answer.txt");
    let mut view = AnswerView::new();
    render(&raw, &mut view);

    assert_eq!(view.nodes().len(), 4);
    assert_eq!(
        view.nodes()[0],
        AnswerNode::Paragraph(vec![Inline::Text(
            "Here is the full squad of Arsenal for the 2024 season:".to_string()
        )])
    );

    let cards = view.cards().collect::<Vec<_>>();
    let names = cards.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["David Raya", "William Saliba", "Bukayo Saka"]);
    assert_eq!(
        cards[0].details,
        vec![
            pair("Position", "Goalkeeper"),
            pair("Birth Date", "1995-09-15"),
            pair("Number", "22"),
        ]
    );
    assert_eq!(
        cards[1].details,
        vec![pair("Position", "Defender"), pair("Birth Place", "Bondy, France")]
    );
    assert_eq!(
        cards[2].details[1],
        pair(
            "Photo",
            "https://media.api-sports.io/football/players/1460.png"
        )
    );
}

#[test]
fn detail_line_pairs_label_with_value() {
    assert_eq!(
        parse_detail_line("- **Position**: Striker"),
        pair("Position", "Striker")
    );
    assert_eq!(
        parse_detail_line("**Position:** Striker"),
        pair("Position", "Striker")
    );
    assert_eq!(parse_detail_line("Kick-off: 15:00"), pair("Kick-off", "15:00"));
}

#[test]
fn detail_value_drops_inner_emphasis() {
    assert_eq!(
        parse_detail_line("- **Club**: **Arsenal** (on loan)"),
        pair("Club", "Arsenal (on loan)")
    );
    assert_eq!(
        parse_detail_line("- Status: fit, **back** in training"),
        pair("Status", "fit, back in training")
    );
}

#[test]
fn detail_line_without_colon_becomes_note() {
    assert_eq!(
        parse_detail_line("- Currently injured"),
        pair("", "Currently injured")
    );
}

#[test]
fn intro_is_literal_text() {
    let mut view = AnswerView::new();
    render("The **full squad** is:\n\n1. **Raya**", &mut view);
    assert_eq!(
        view.nodes()[0],
        AnswerNode::Paragraph(vec![Inline::Text("The **full squad** is:".to_string())])
    );
}

#[test]
fn malformed_blocks_degrade_to_partial_cards() {
    let answer = "full squad below\n\n**Solo Name**\n\n\n\n3. \n\n  \n\n4. **Ben White**\n- Right back";
    let squad = parse_squad_answer(answer);
    assert_eq!(
        squad.players,
        vec![
            PlayerRecord {
                name: "Solo Name".to_string(),
                details: Vec::new(),
            },
            PlayerRecord {
                name: "Ben White".to_string(),
                details: vec![pair("", "Right back")],
            },
        ]
    );
}

#[test]
fn squad_answer_without_blocks_is_intro_only() {
    let mut view = AnswerView::new();
    render("I could not find the full squad.", &mut view);
    assert_eq!(view.nodes().len(), 1);
    assert_eq!(view.cards().count(), 0);
}

#[test]
fn crlf_answers_split_the_same_way() {
    let squad = parse_squad_answer("full squad:\r\n\r\n1. **Raya**\r\n- Age: 29");
    assert_eq!(squad.intro, "full squad:");
    assert_eq!(squad.players.len(), 1);
    assert_eq!(squad.players[0].details, vec![pair("Age", "29")]);
}

#[test]
fn plain_mode_bolds_and_breaks() {
    assert_eq!(
        parse_inline_markup("Hello **world**\nSecond line"),
        vec![
            Inline::Text("Hello ".to_string()),
            Inline::Strong("world".to_string()),
            Inline::Break,
            Inline::Text("Second line".to_string()),
        ]
    );
}

#[test]
fn plain_mode_leaves_unmatched_markers() {
    assert_eq!(
        parse_inline_markup("**a** and **b"),
        vec![
            Inline::Strong("a".to_string()),
            Inline::Text(" and **b".to_string()),
        ]
    );
    // Emphasis does not cross a line break.
    assert_eq!(
        parse_inline_markup("**open\nclose**"),
        vec![
            Inline::Text("**open".to_string()),
            Inline::Break,
            Inline::Text("close**".to_string()),
        ]
    );
}

#[test]
fn messi_answer_renders_inline_emphasis() {
    let mut view = AnswerView::new();
    render("**Messi** plays striker.", &mut view);
    assert_eq!(
        view.nodes(),
        &[AnswerNode::Paragraph(vec![
            Inline::Strong("Messi".to_string()),
            Inline::Text(" plays striker.".to_string()),
        ])]
    );
}

#[test]
fn render_replaces_previous_content() {
    let mut view = AnswerView::new();
    render("first", &mut view);
    render("second", &mut view);
    assert_eq!(view.plain_text(), "second");
}

#[test]
fn text_mode_keeps_markers() {
    let mut view = AnswerView::new();
    render_text("**Messi**\nfull squad", &mut view);
    assert_eq!(
        view.nodes(),
        &[AnswerNode::Paragraph(vec![
            Inline::Text("**Messi**".to_string()),
            Inline::Break,
            Inline::Text("full squad".to_string()),
        ])]
    );
    assert_eq!(view.cards().count(), 0);
}

#[test]
fn long_details_wrap_onto_extra_rows() {
    let card = PlayerRecord {
        name: "Bukayo Saka".to_string(),
        details: vec![
            pair("Position", "Winger"),
            pair(
                "Photo",
                "https://media.api-sports.io/football/players/1460.png",
            ),
        ],
    };
    // "Position: Winger" fits in 20 columns; the 60-char photo line needs 3 rows.
    assert_eq!(card.wrapped_rows(20), 4);
    assert_eq!(card.wrapped_rows(200), 2);
    // A zero-width pane still counts one column per row instead of dividing by zero.
    assert_eq!(card.wrapped_rows(0), 16 + 60);
}

#[test]
fn wrapped_rows_saturate_instead_of_wrapping_around() {
    let card = PlayerRecord {
        name: "Squad".to_string(),
        details: vec![pair("", "x"); 70_000],
    };
    assert_eq!(card.wrapped_rows(80), u16::MAX);
    assert_eq!(PlayerRecord::default().wrapped_rows(80), 0);
}
