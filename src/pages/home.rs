use leptos::prelude::*;

use crate::components::force_graph::state::{UNKNOWN_TYPE_COLOR, UNKNOWN_TYPE_NAME};
use crate::components::force_graph::{
	CharacterRecord, GraphData, NodeId, RelationshipGraph, RelationshipRecord, RelationshipType,
};

const NAMES: &[&str] = &[
	"Ada", "Bastian", "Corin", "Delphine", "Edda", "Fenwick", "Greta", "Hollis",
];

fn relationship_types() -> Vec<RelationshipType> {
	[
		(1, "Family", "#ef4444"),
		(2, "Friend", "#22c55e"),
		(3, "Rival", "#f97316"),
		(4, "Mentor", "#3b82f6"),
	]
	.into_iter()
	.map(|(id, name, color)| RelationshipType {
		id,
		name: name.into(),
		color: color.into(),
	})
	.collect()
}

fn character(id: NodeId, name: &str) -> CharacterRecord {
	CharacterRecord {
		id,
		name: name.into(),
		avatar: None,
	}
}

fn relationship(
	id: i64,
	source_id: NodeId,
	target_id: NodeId,
	type_id: i64,
	description: &str,
) -> RelationshipRecord {
	RelationshipRecord {
		id: Some(id),
		source_id,
		target_id,
		type_id,
		description: Some(description.into()),
	}
}

fn sample_data() -> GraphData {
	GraphData {
		characters: NAMES
			.iter()
			.zip(1..)
			.map(|(name, id)| character(id, name))
			.collect(),
		relationships: vec![
			relationship(1, 1, 2, 1, "Siblings"),
			relationship(2, 1, 3, 2, "Grew up together"),
			relationship(3, 2, 4, 3, "Competing for the same post"),
			relationship(4, 5, 1, 4, "Taught Ada everything she knows"),
			relationship(5, 5, 6, 4, "Former apprentice"),
			relationship(6, 3, 7, 2, "Travel companions"),
			relationship(7, 7, 8, 1, "Cousins"),
			relationship(8, 6, 4, 3, "Old grudge"),
		],
		relationship_types: relationship_types(),
	}
}

/// Deterministic stand-in for randomness, so a given cast always grows the
/// same way.
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Appends a new character tied to one already on the board.
fn add_character(data: &mut GraphData) {
	let id = data.characters.iter().map(|c| c.id).max().unwrap_or(0) + 1;
	let count = data.characters.len();
	data.characters.push(character(id, &format!("Newcomer {id}")));
	if count == 0 {
		return;
	}
	let other = data.characters[(rand_simple(count) * count as f64) as usize].id;
	let type_id = 1 + (rand_simple(count + 7) * 4.0) as i64;
	let relationship_id = data.relationships.iter().filter_map(|r| r.id).max().unwrap_or(0) + 1;
	data.relationships
		.push(relationship(relationship_id, id, other, type_id, "Just met"));
}

/// One line per relationship touching `id`, as (type color, text).
fn describe(data: &GraphData, id: NodeId) -> Vec<(String, String)> {
	let name_of = |other: NodeId| {
		data.characters
			.iter()
			.find(|c| c.id == other)
			.map_or_else(|| format!("#{other}"), |c| c.name.clone())
	};
	data.relationships
		.iter()
		.filter(|r| r.source_id == id || r.target_id == id)
		.map(|r| {
			let kind = data.relationship_types.iter().find(|t| t.id == r.type_id);
			let other = if r.source_id == id { r.target_id } else { r.source_id };
			let mut text = format!(
				"{} · {}",
				kind.map_or(UNKNOWN_TYPE_NAME, |t| t.name.as_str()),
				name_of(other)
			);
			if let Some(description) = &r.description {
				text.push_str(&format!(" ({description})"));
			}
			(
				kind.map_or(UNKNOWN_TYPE_COLOR, |t| t.color.as_str()).to_owned(),
				text,
			)
		})
		.collect()
}

/// Sample cast in the graph, with a panel listing the selected character's relationships.
#[component]
pub fn Home() -> impl IntoView {
	let data = RwSignal::new(sample_data());
	let selected = RwSignal::new(None::<NodeId>);

	let details = move || {
		let id = selected.get()?;
		let data = data.read();
		let name = data.characters.iter().find(|c| c.id == id)?.name.clone();
		let lines = describe(&data, id);
		Some(view! {
			<aside class="graph-details">
				<h3>{name}</h3>
				<ul>
					{lines
						.into_iter()
						.map(|(color, text)| {
							view! {
								<li>
									<span class="swatch" style=format!("background: {color};")></span>
									{text}
								</li>
							}
						})
						.collect_view()}
				</ul>
			</aside>
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"The graph could not be shown"</h1>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="graph-page">
				<header class="graph-overlay">
					<h1>"Relationship Graph"</h1>
					<p class="subtitle">
						"Drag characters to reposition. Scroll or pinch to zoom. Hold Space or drag the background to pan. Esc clears the selection."
					</p>
					<button on:click=move |_| data.update(add_character)>"Add character"</button>
				</header>
				<RelationshipGraph
					data=data
					on_select={move |id: Option<NodeId>| selected.set(id)}
				/>
				{details}
			</div>
		</ErrorBoundary>
	}
}
