use console::style;

use crate::config::EndpointConfig;
use crate::providers::EntitySet;

fn dim(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).dim()
}

fn cyan(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).cyan()
}

fn bright(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        style("📈 gitlab-exporter").magenta().bold(),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Prometheus exporter for GitLab")
    );
}

/// Lists the projects metrics will be exported for.
pub fn print_entities(entities: &EntitySet) {
    eprintln!("{}", bright("Exporting for these projects:").underlined());
    if entities.projects.is_empty() {
        eprintln!("  {}", dim("(none)"));
    }
    for project in &entities.projects {
        eprintln!("  {} {}", cyan("•"), project.path);
    }
    eprintln!(
        "  {}",
        dim(format!(
            "{} projects, {} groups",
            entities.projects.len(),
            entities.groups.len()
        ))
    );
    eprintln!();
}

pub fn print_endpoints(bind_address: &str, endpoints: &[EndpointConfig]) {
    eprintln!("{}", bright("Endpoints:").underlined());
    for endpoint in endpoints {
        let facets: Vec<String> = endpoint.collectors.iter().map(ToString::to_string).collect();
        eprintln!(
            "  {} {} {}",
            cyan(format!("http://{bind_address}:{}/metrics", endpoint.port)),
            bright(&endpoint.name),
            dim(facets.join(", "))
        );
    }
    eprintln!();
}
