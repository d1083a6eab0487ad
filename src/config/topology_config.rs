use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use log::debug;
use crate::RouterId;
use crate::error::{ConfigError, ConfigurationError};
use crate::network::{Link, Topology};

/// Topology as entered by a user: node names plus an undirected link list.
///
/// Accepted as JSON (`{"nodes": [...], "links": [{"from", "to", "cost"}]}`)
/// or as a plain text list where the first line holds the node names and
/// every following line reads `<Node1> <Node2> <Cost>`. `#` starts a comment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub nodes: Vec<RouterId>,
    pub links: Vec<Link>,
}

impl TopologyConfig {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let is_json = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::parse_text(&content)?
        };

        debug!(
            "Loaded topology from {}: {} nodes, {} links",
            path,
            config.nodes.len(),
            config.links.len()
        );
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn parse_text(content: &str) -> Result<Self, ConfigError> {
        let mut config = TopologyConfig::default();
        let mut have_nodes = false;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            if have_nodes {
                config.links.push(parse_link(line, index + 1)?);
            } else {
                config.nodes = line.split_whitespace().map(str::to_string).collect();
                have_nodes = true;
            }
        }

        if !have_nodes {
            return Err(ConfigError::Parse {
                line: 0,
                message: "no node names given".to_string(),
            });
        }

        Ok(config)
    }

    /// Prompts for the topology on `output` and reads answers from `input`:
    /// node count, node names, link count, then one link per line.
    pub fn read_interactive<R: BufRead, W: Write>(input: R, mut output: W) -> Result<Self, ConfigError> {
        let mut prompter = Prompter { input, line: 0 };

        write!(output, "Enter number of nodes: ")?;
        output.flush()?;
        let node_count = prompter.read_count()?;

        writeln!(output, "\nEnter names of nodes (e.g., A B C):")?;
        output.flush()?;
        let names = prompter.read_line()?;
        let nodes: Vec<RouterId> = names.split_whitespace().map(str::to_string).collect();
        if nodes.len() != node_count {
            return Err(ConfigError::Parse {
                line: prompter.line,
                message: format!("expected {} node names, got {}", node_count, nodes.len()),
            });
        }

        write!(output, "\nEnter number of links: ")?;
        output.flush()?;
        let link_count = prompter.read_count()?;

        writeln!(output, "Enter link details in the format: <Node1> <Node2> <Cost>")?;
        output.flush()?;
        let mut links = Vec::new();
        for _ in 0..link_count {
            let line = prompter.read_line()?;
            links.push(parse_link(&line, prompter.line)?);
        }

        Ok(Self { nodes, links })
    }

    pub fn into_topology(self) -> Result<Topology, ConfigurationError> {
        Topology::from_links(self.nodes, self.links)
    }
}

struct Prompter<R> {
    input: R,
    line: usize,
}

impl<R: BufRead> Prompter<R> {
    fn read_line(&mut self) -> Result<String, ConfigError> {
        let mut buffer = String::new();
        let read = self.input.read_line(&mut buffer)?;
        self.line += 1;

        if read == 0 {
            return Err(ConfigError::Parse {
                line: self.line,
                message: "unexpected end of input".to_string(),
            });
        }
        Ok(buffer.trim().to_string())
    }

    fn read_count(&mut self) -> Result<usize, ConfigError> {
        let line = self.read_line()?;
        line.parse().map_err(|_| ConfigError::Parse {
            line: self.line,
            message: format!("expected a number, got {:?}", line),
        })
    }
}

fn parse_link(line: &str, line_number: usize) -> Result<Link, ConfigError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [from, to, cost] = parts.as_slice() else {
        return Err(ConfigError::Parse {
            line: line_number,
            message: format!("expected <Node1> <Node2> <Cost>, got {:?}", line),
        });
    };

    let cost = cost.parse::<i64>().map_err(|_| ConfigError::Parse {
        line: line_number,
        message: format!("invalid cost {:?}", cost),
    })?;

    Ok(Link::new(from, to, cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cost;
    use crate::network::LinkCostResolver;
    use std::io::Cursor;

    #[test]
    fn parses_text_link_list() {
        let config = TopologyConfig::parse_text(
            "# triangle\nA B C\n\nA B 1\nB C 1 # cheap\nA C 5\n",
        )
        .unwrap();

        assert_eq!(config.nodes, vec!["A", "B", "C"]);
        assert_eq!(config.links[2], Link::new("A", "C", 5));

        let topology = config.into_topology().unwrap();
        assert_eq!(topology.cost("B", "C"), Cost::Finite(1));
    }

    #[test]
    fn reports_line_of_bad_link() {
        let err = TopologyConfig::parse_text("A B\nA B one\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));

        let err = TopologyConfig::parse_text("A B\nA B\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[test]
    fn empty_text_has_no_nodes() {
        let err = TopologyConfig::parse_text("# nothing\n\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn parses_json() {
        let config = TopologyConfig::from_json_str(
            r#"{"nodes": ["A", "B"], "links": [{"from": "A", "to": "B", "cost": 3}]}"#,
        )
        .unwrap();

        assert_eq!(config.links, vec![Link::new("A", "B", 3)]);
    }

    #[test]
    fn reads_interactive_answers() {
        let answers = "3\nA B C\n2\nA B 1\nB C 4\n";
        let mut prompts = Vec::new();
        let config = TopologyConfig::read_interactive(Cursor::new(answers), &mut prompts).unwrap();

        assert_eq!(config.nodes, vec!["A", "B", "C"]);
        assert_eq!(config.links, vec![Link::new("A", "B", 1), Link::new("B", "C", 4)]);
        let prompts = String::from_utf8(prompts).unwrap();
        assert!(prompts.starts_with("Enter number of nodes: "));
        assert!(prompts.contains("<Node1> <Node2> <Cost>"));
    }

    #[test]
    fn interactive_name_count_must_match() {
        let err = TopologyConfig::read_interactive(Cursor::new("3\nA B\n"), std::io::sink()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[test]
    fn interactive_input_ending_early_is_an_error() {
        let err = TopologyConfig::read_interactive(Cursor::new("2\nA B\n1\n"), std::io::sink()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 4, .. }));
    }

    #[test]
    fn interactive_huge_link_count_is_an_error() {
        let input = Cursor::new("2\nA B\n99999999999999999\n");
        let err = TopologyConfig::read_interactive(input, std::io::sink()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 4, .. }));
    }

    #[test]
    fn json_file_round_trip_through_disk() {
        let path = std::env::temp_dir().join(format!("dv-routing-topology-{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let config = TopologyConfig {
            nodes: vec!["A".to_string(), "B".to_string()],
            links: vec![Link::new("A", "B", 2)],
        };

        config.save_to_file(&path).unwrap();
        let loaded = TopologyConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }
}
