use log::trace;
use std::collections::{HashMap, HashSet};

use crate::graph::ReferenceGraph;

impl ReferenceGraph {
    /// Whether the node at `path` can be reached from the live document.
    ///
    /// A non-component with no owning component is live. Anything else is required when its
    /// owning component (non-components only) or any of its referrers is required. The search
    /// walks those edges backwards with an explicit stack, so reference cycles and deep chains
    /// are safe.
    ///
    /// `visiting` holds every path already on the caller's search and is extended with every
    /// path explored here. Pass an empty set for a top-level query. A positive answer is
    /// memoized along the chain that proved it. A negative answer is memoized for every
    /// explored path, but only when `visiting` started empty: a nested query that stops at
    /// paths its caller is still exploring has not seen the whole picture.
    pub fn is_required(&mut self, path: &str, visiting: &mut HashSet<String>) -> bool {
        let Some(start) = self.entries.get(path) else {
            return false;
        };
        if let Some(required) = start.required {
            return required;
        }

        let top_level = visiting.is_empty();
        visiting.insert(path.to_string());

        let mut came_from: HashMap<String, String> = HashMap::new();
        let mut explored: Vec<String> = vec![path.to_string()];
        let mut stack: Vec<String> = vec![path.to_string()];
        let mut proof: Option<String> = None;

        while let Some(current) = stack.pop() {
            let Some(entry) = self.entries.get(&current) else {
                continue;
            };

            match entry.required {
                Some(true) => {
                    proof = Some(current);
                    break;
                }
                Some(false) => continue,
                _ => {}
            }

            let mut next: Vec<&String> = Vec::new();
            if !entry.is_component() {
                match &entry.owning_component {
                    None => {
                        trace!("{} is live", current);
                        proof = Some(current);
                        break;
                    }
                    Some(owner) => next.push(owner),
                }
            }
            next.extend(entry.referrers.iter());

            // Reversed so the owner is explored first
            for candidate in next.into_iter().rev() {
                if visiting.insert(candidate.clone()) {
                    came_from.insert(candidate.clone(), current.clone());
                    explored.push(candidate.clone());
                    stack.push(candidate.clone());
                }
            }
        }

        match proof {
            Some(mut node) => {
                loop {
                    if let Some(entry) = self.entries.get_mut(&node) {
                        entry.required = Some(true);
                    }
                    match came_from.get(&node) {
                        Some(prev) => node = prev.clone(),
                        None => break,
                    }
                }
                trace!("{} is required", path);
                true
            }
            None => {
                if top_level {
                    for p in &explored {
                        if let Some(entry) = self.entries.get_mut(p) {
                            entry.required = Some(false);
                        }
                    }
                }
                trace!("{} is not required", path);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dialect::Dialect, graph::GraphBuilder};
    use oasclean_core::{Format, parse};

    fn graph(text: &str) -> ReferenceGraph {
        let root = parse(text, Format::Yaml).unwrap();
        GraphBuilder::new(Dialect::detect(&root).unwrap()).build(&root).unwrap()
    }

    fn required(graph: &mut ReferenceGraph, path: &str) -> bool {
        graph.is_required(path, &mut HashSet::new())
    }

    const CHAIN: &str = r#"openapi: 3.0.0
paths:
  /wibble:
    post:
      requestBody:
        $ref: '#/components/requestBodies/body'
components:
  requestBodies:
    body:
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/outer'
    orphanBody:
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/outer'
  schemas:
    outer:
      type: array
      items:
        $ref: '#/components/schemas/inner'
    inner:
      type: string
    loopA:
      $ref: '#/components/schemas/loopB'
    loopB:
      items:
        $ref: '#/components/schemas/loopA'
"#;

    #[test]
    fn test_live_referrer_is_required() {
        let mut g = graph(CHAIN);
        assert!(required(&mut g, "/paths//wibble/post/requestBody"));
    }

    #[test]
    fn test_transitive_requirement_through_owners() {
        let mut g = graph(CHAIN);
        assert!(required(&mut g, "/components/schemas/inner"));
        assert_eq!(g.entry("/components/schemas/inner").unwrap().required, Some(true));
        assert_eq!(g.entry("/components/schemas/outer").unwrap().required, Some(true));
        assert_eq!(g.entry("/components/requestBodies/body").unwrap().required, Some(true));
    }

    #[test]
    fn test_unreferenced_component_is_not_required() {
        let mut g = graph(CHAIN);
        assert!(!required(&mut g, "/components/requestBodies/orphanBody"));
        // A referrer inside an unused component does not keep its target alive on its own
        assert!(!required(
            &mut g,
            "/components/requestBodies/orphanBody/content/application/json/schema"
        ));
        assert!(required(&mut g, "/components/schemas/outer"));
    }

    #[test]
    fn test_cycle_terminates_and_is_not_required() {
        let mut g = graph(CHAIN);
        assert!(!required(&mut g, "/components/schemas/loopA"));
        assert!(!required(&mut g, "/components/schemas/loopB"));
        assert_eq!(g.entry("/components/schemas/loopA").unwrap().required, Some(false));
        assert_eq!(g.entry("/components/schemas/loopB/items").unwrap().required, Some(false));
    }

    #[test]
    fn test_cycle_reached_from_live_path_is_required() {
        let mut g = graph(
            r#"openapi: 3.0.0
paths:
  /c:
    get:
      $ref: '#/components/schemas/cycA'
components:
  schemas:
    cycA:
      items:
        $ref: '#/components/schemas/cycB'
    cycB:
      items:
        $ref: '#/components/schemas/cycA'
"#,
        );
        assert!(required(&mut g, "/components/schemas/cycB"));
        // Proving cycB walked through cycA, so both answers are cached
        assert_eq!(g.entry("/components/schemas/cycA").unwrap().required, Some(true));
        assert_eq!(g.entry("/components/schemas/cycB").unwrap().required, Some(true));
        assert!(required(&mut g, "/components/schemas/cycA"));
    }

    #[test]
    fn test_memoized_answers_are_stable() {
        let mut g = graph(CHAIN);
        let paths: Vec<String> = g.components().map(|e| e.path.clone()).collect();
        let first: Vec<bool> = paths.iter().map(|p| required(&mut g, p)).collect();
        let second: Vec<bool> = paths.iter().map(|p| required(&mut g, p)).collect();
        assert_eq!(first, second);
        assert_eq!(first.iter().filter(|r| **r).count(), 3);
    }

    #[test]
    fn test_nested_query_does_not_memoize_negative() {
        let mut g = graph(CHAIN);
        let mut visiting: HashSet<String> = HashSet::new();
        visiting.insert("/components/requestBodies/body".to_string());
        // The only route to live passes through a path the caller is still exploring
        assert!(!g.is_required("/components/schemas/outer", &mut visiting));
        assert_eq!(g.entry("/components/schemas/outer").unwrap().required, None);
        assert!(required(&mut g, "/components/schemas/outer"));
    }

    #[test]
    fn test_unknown_path_is_not_required() {
        let mut g = graph(CHAIN);
        assert!(!required(&mut g, "/components/schemas/nope"));
    }

    #[test]
    fn test_deep_reference_chain() {
        let mut text = String::from(
            "openapi: 3.0.0\npaths:\n  /a:\n    get:\n      $ref: '#/components/schemas/s0'\ncomponents:\n  schemas:\n",
        );
        let depth = 5000;
        for i in 0..depth {
            text.push_str(&format!(
                "    s{}:\n      items:\n        $ref: '#/components/schemas/s{}'\n",
                i,
                i + 1
            ));
        }
        text.push_str(&format!("    s{}:\n      type: string\n", depth));
        let mut g = graph(&text);
        assert!(required(&mut g, &format!("/components/schemas/s{}", depth)));
    }
}
