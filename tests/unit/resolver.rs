use taxform::config::EngineConfig;
use taxform::core::TemplateDefect;
use taxform::model::{ControlType, DynamicSection, Field, LocationInfo, Section, Template};
use taxform::parser::parse_template;
use taxform::resolver::resolve_dependencies;
use taxform::test_utils::fixtures;

#[test]
fn test_province_ward_edges() {
    let template = parse_template(fixtures::BASIC_TEMPLATE, "01/GTGT", &EngineConfig::default())
        .template
        .unwrap();
    let resolution = resolve_dependencies(&template);

    assert!(resolution.is_sound());
    assert_eq!(resolution.graph.edge_count(), 1);
    assert_eq!(resolution.graph.parent_of("phuong").map(|f| f.id.as_str()), Some("tinh"));
    let children: Vec<_> =
        resolution.graph.children_of("tinh").iter().map(|f| f.id.as_str()).collect();
    assert_eq!(children, vec!["phuong"]);
    assert!(resolution.graph.parent_of("tinh").is_none());
    assert!(resolution.graph.children_of("nope").is_empty());
}

#[test]
fn test_dangling_and_cycle_are_reported_not_fatal() {
    let template = Template::new(
        "1",
        "X",
        vec![
            Section::fixed(
                "S1",
                vec![
                    Field::new("a", "p/a", ControlType::DependentDropdown).with_parent("c"),
                    Field::new("b", "p/b", ControlType::DependentDropdown).with_parent("a"),
                    Field::new("c", "p/c", ControlType::DependentDropdown).with_parent("b"),
                    Field::new("d", "p/d", ControlType::WardDropdown).with_parent("ghost"),
                ],
            ),
            Section::dynamic(
                "S2",
                DynamicSection {
                    max_rows: 0,
                    table_id: "T".to_string(),
                    table_path: "rows".to_string(),
                    location: LocationInfo::default(),
                    row_template: vec![
                        Field::new("r", "r", ControlType::Text).with_child("ghost2"),
                    ],
                },
            ),
        ],
    );
    let resolution = resolve_dependencies(&template);

    assert!(!resolution.is_sound());
    assert!(!resolution.graph.is_acyclic());
    let dangling = resolution
        .structural_errors
        .iter()
        .filter(|e| matches!(e, TemplateDefect::DanglingDependency { .. }))
        .count();
    let cycles: Vec<_> = resolution
        .structural_errors
        .iter()
        .filter_map(|e| match e {
            TemplateDefect::DependencyCycle {
                chain,
            } => Some(chain),
            _ => None,
        })
        .collect();
    assert_eq!(dangling, 2);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 4);
    assert_eq!(cycles[0].first(), cycles[0].last());
}
