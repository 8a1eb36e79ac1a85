//! Validated task graph
//!
//! Only the tasks reachable from the requested roots are loaded into the
//! graph. Every reachable name must exist and the dependency edges must be
//! acyclic; both are checked before anything runs.

use crate::config::types::{Config, Task};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;

/// Index of a node in a [`TaskGraph`]
pub type NodeId = usize;

/// A task plus its dependency groups, resolved to node ids
#[derive(Debug)]
pub struct TaskNode<'a> {
    pub name: &'a str,
    pub task: &'a Task,
    pub groups: Vec<Vec<NodeId>>,
}

/// Arena of the tasks reachable from a set of roots
#[derive(Debug)]
pub struct TaskGraph<'a> {
    nodes: Vec<TaskNode<'a>>,
    roots: Vec<NodeId>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl<'a> TaskGraph<'a> {
    /// Resolve `roots` and everything they depend on
    pub fn resolve(config: &'a Config, roots: &[String]) -> ConfigResult<Self> {
        let mut builder = Builder {
            config,
            nodes: Vec::new(),
            index: HashMap::new(),
        };

        let mut root_ids = Vec::with_capacity(roots.len());
        for name in roots {
            let id = builder.node_for(name).ok_or_else(|| ConfigError::TaskNotFound(name.clone()))?;
            root_ids.push(id);
        }

        // Resolve edges breadth-first; new nodes are appended as they are discovered
        let mut next = 0;
        while next < builder.nodes.len() {
            let (task_name, task) = (builder.nodes[next].name, builder.nodes[next].task);
            let mut groups = Vec::with_capacity(task.deps.len());
            for group in &task.deps {
                let mut ids = Vec::with_capacity(group.len());
                for dep in group {
                    let id = builder.node_for(dep).ok_or_else(|| ConfigError::UnknownDependency {
                        task: task_name.to_string(),
                        dependency: dep.clone(),
                    })?;
                    ids.push(id);
                }
                groups.push(ids);
            }
            builder.nodes[next].groups = groups;
            next += 1;
        }

        let graph = TaskGraph {
            nodes: builder.nodes,
            roots: root_ids,
        };
        graph.check_cycles()?;
        Ok(graph)
    }

    /// The requested tasks, in request order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &TaskNode<'a> {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first search with an on-stack marker; a back edge is a cycle
    fn check_cycles(&self) -> ConfigResult<()> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut stack = Vec::new();

        for id in 0..self.nodes.len() {
            if marks[id] == Mark::Unvisited {
                self.visit(id, &mut marks, &mut stack)?;
            }
        }
        Ok(())
    }

    fn visit(&self, id: NodeId, marks: &mut [Mark], stack: &mut Vec<NodeId>) -> ConfigResult<()> {
        marks[id] = Mark::OnStack;
        stack.push(id);

        for &dep in self.nodes[id].groups.iter().flatten() {
            match marks[dep] {
                Mark::OnStack => {
                    let start = stack.iter().position(|&n| n == dep).unwrap_or(0);
                    let mut path: Vec<&str> = stack[start..].iter().map(|&n| self.nodes[n].name).collect();
                    path.push(self.nodes[dep].name);
                    return Err(ConfigError::CircularDependency(path.join(" -> ")));
                }
                Mark::Unvisited => self.visit(dep, marks, stack)?,
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[id] = Mark::Done;
        Ok(())
    }
}

struct Builder<'a> {
    config: &'a Config,
    nodes: Vec<TaskNode<'a>>,
    index: HashMap<&'a str, NodeId>,
}

impl<'a> Builder<'a> {
    /// Node id for a task name, adding it to the arena on first sight
    fn node_for(&mut self, name: &str) -> Option<NodeId> {
        if let Some(&id) = self.index.get(name) {
            return Some(id);
        }

        let config = self.config;
        let (name, task) = config.tasks.get_key_value(name)?;
        let id = self.nodes.len();
        self.nodes.push(TaskNode {
            name: name.as_str(),
            task,
            groups: Vec::new(),
        });
        self.index.insert(name.as_str(), id);
        Some(id)
    }
}
