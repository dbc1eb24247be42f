use anyhow::{anyhow, Context, Result};
use log::info;
use remote::HttpGateway;
use tree_structure::tree::{StructureTree, Tree, TreeTraversal};
use tree_structure::{
    render_outline, Anchor, Attachment, NodeKey, PrefixKey, StructureEditor, TreeKey,
};

use crate::Command;

pub async fn run(gateway: &HttpGateway, command: Command) -> Result<()> {
    match command {
        Command::Trees => list_trees(gateway).await,
        Command::Prefixes => list_prefixes(gateway).await,
        Command::Show { tree } => show(gateway, tree.into()).await,
        Command::AttachNode { tree, anchor, node } => {
            let node = gateway
                .get_node(&NodeKey::from(node))
                .await
                .context("Failed to load the node to attach")?;
            attach(gateway, tree.into(), anchor.into(), Attachment::ExistingNode(node)).await
        }
        Command::AttachCode {
            tree,
            anchor,
            prefix,
        } => {
            let attachment = Attachment::NewPrefixCode {
                prefix: PrefixKey::from(prefix),
            };
            attach(gateway, tree.into(), anchor.into(), attachment).await
        }
        Command::AttachSubtree { tree, anchor, node } => {
            let node = gateway
                .get_node(&NodeKey::from(node))
                .await
                .context("Failed to load the subtree root")?;
            attach(gateway, tree.into(), anchor.into(), Attachment::Subtree(node)).await
        }
    }
}

async fn list_trees(gateway: &HttpGateway) -> Result<()> {
    let trees = gateway.list_trees().await.context("Failed to list trees")?;
    for tree in trees {
        match tree.description {
            Some(description) => println!("{}\t{}\t{}", tree.id, tree.name, description),
            None => println!("{}\t{}", tree.id, tree.name),
        }
    }
    Ok(())
}

async fn list_prefixes(gateway: &HttpGateway) -> Result<()> {
    let prefixes = gateway
        .list_prefixes()
        .await
        .context("Failed to list prefixes")?;
    for prefix in prefixes {
        println!("{}\t{}\t{}", prefix.id, prefix.name, prefix.code_type);
    }
    Ok(())
}

async fn show(gateway: &HttpGateway, tree: TreeKey) -> Result<()> {
    let editor = StructureEditor::load(gateway, tree.clone())
        .await
        .with_context(|| format!("Failed to load tree {}", tree))?;

    let view = StructureTree::new(editor.structure());
    println!("{}", render_outline(editor.structure()));
    println!();
    println!(
        "{} node(s), {} without children",
        view.node_count(),
        view.leaves().len()
    );
    Ok(())
}

async fn attach(
    gateway: &HttpGateway,
    tree: TreeKey,
    anchor: NodeKey,
    attachment: Attachment,
) -> Result<()> {
    let mut editor = StructureEditor::load(gateway, tree.clone())
        .await
        .with_context(|| format!("Failed to load tree {}", tree))?;

    let anchor: Anchor = editor
        .anchor_for(&anchor)
        .ok_or_else(|| anyhow!("Node {} is not part of tree {}", anchor, tree))?;

    editor
        .attach(gateway, &anchor, attachment)
        .await
        .context("Attachment was rejected")?;
    editor
        .persist(gateway)
        .await
        .context("Failed to save the structure")?;

    info!("Tree {} now has {} edge(s)", tree, editor.structure().len());
    println!("{}", render_outline(editor.structure()));
    Ok(())
}
