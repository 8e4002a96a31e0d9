use rs_purifier::policy::{Policy, Rule};
use rs_purifier::selector::Selector;
use rs_purifier::{Agent, AgentOptions, Extraction};

const PAGES: [(&str, &str); 4] = [
    (
        "https://example.com/story/1",
        r#"<h1>One</h1><div class="body">First <a href="/x">story</a></div>"#,
    ),
    (
        "https://example.com/story/2",
        r#"<div class="lead">Lead</div><div class="body">Second story</div>"#,
    ),
    ("https://example.com/story/3", "<p>no content here</p>"),
    (
        "https://example.com/story/4",
        r#"<h1>Four</h1><div class="lead">Lead</div><div class="body">Fourth story</div>"#,
    ),
];

fn agent() -> Agent {
    let mut builder = Agent::builder(&AgentOptions {
        readability_fallback: false,
        ..AgentOptions::default()
    });
    builder
        .register(
            Policy::builder("policy_story", "r:https://example\\.com/story/.*")
                .named_template(
                    "a_lead",
                    vec![
                        Rule::new(Selector::attr("div", "class", "lead").unwrap()),
                        Rule::new(Selector::attr("div", "class", "body").unwrap()),
                    ],
                )
                .named_template(
                    "b_plain",
                    vec![
                        Rule::new(Selector::tag("h1")),
                        Rule::new(Selector::attr("div", "class", "body").unwrap()),
                    ],
                )
                .build()
                .unwrap(),
        )
        .unwrap();
    builder.build()
}

fn run(agent: &Agent, url: &str, html: &str) -> Result<Extraction, String> {
    agent.extract("text/html", url, html, true).map_err(|e| e.to_string())
}

fn fresh_results() -> Vec<Result<Extraction, String>> {
    PAGES
        .iter()
        .map(|(url, html)| run(&agent(), url, html))
        .collect()
}

#[test]
fn page_matching_both_templates_uses_first_by_name() {
    let (url, html) = PAGES[3];
    let extraction = run(&agent(), url, html).unwrap();
    assert_eq!(extraction.reason.template.as_deref(), Some("a_lead"));
    assert!(extraction.text.starts_with("Lead"));
}

#[test]
fn call_history_does_not_change_results() {
    let expected = fresh_results();
    let shared = agent();
    for order in [[0, 1, 2, 3], [3, 0, 3, 1], [1, 3, 2, 0], [0, 3, 0, 3]] {
        for index in order {
            let (url, html) = PAGES[index];
            assert_eq!(run(&shared, url, html), expected[index], "page {index}");
        }
    }
}

#[test]
fn shared_agent_gives_identical_results_across_threads() {
    let expected = fresh_results();

    let shared = agent();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let shared = &shared;
                let expected = &expected;
                scope.spawn(move || {
                    for round in 0..50 {
                        let index = (worker + round) % PAGES.len();
                        let (url, html) = PAGES[index];
                        assert_eq!(run(shared, url, html), expected[index]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}
