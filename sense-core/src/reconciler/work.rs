//! Unit of work: processing one fiber.

use std::sync::Arc;

use super::{reconcile_children, update_dom, WorkContext};
use crate::element::{Component, Element, ElementType, Props};
use crate::error::Result;
use crate::fiber::{FiberId, FiberType};
use crate::hooks::{Hook, HookFrame, HookScope};
use crate::host::Host;

enum Work {
    Component(Component),
    Fragment(Vec<Element>),
    Host,
}

/// Process `id` and return the next fiber of the pass rooted at `root`.
///
/// Errors only come from component renders that broke the hook-order
/// contract while hook validation is enabled.
pub(crate) fn perform_unit_of_work<H: Host>(
    cx: &mut WorkContext<'_, H>,
    id: FiberId,
    root: FiberId,
) -> Result<Option<FiberId>> {
    let Some(fiber) = cx.fibers.get(id) else {
        return Ok(None);
    };
    tracing::trace!(fiber = id.raw(), kind = fiber.fiber_type.name(), "unit of work");

    let work = match &fiber.fiber_type {
        FiberType::Element(ElementType::Component(component)) => Work::Component(component.clone()),
        FiberType::Element(ElementType::Fragment) => Work::Fragment(fiber.props.children().to_vec()),
        FiberType::Root | FiberType::Element(ElementType::Host(_) | ElementType::Text) => Work::Host,
    };

    match work {
        Work::Component(component) => update_component(cx, id, &component)?,
        Work::Fragment(children) => reconcile_children(cx, id, &children),
        Work::Host => update_host_component(cx, id),
    }

    Ok(cx.fibers.next_within(id, root))
}

fn update_host_component<H: Host>(cx: &mut WorkContext<'_, H>, id: FiberId) {
    let Some(fiber) = cx.fibers.get(id) else {
        return;
    };

    let created = match (&fiber.dom, &fiber.fiber_type) {
        (Some(_), _) => None,
        (None, FiberType::Element(ElementType::Text)) => Some(cx.host.create_text_node("")),
        (None, FiberType::Element(ElementType::Host(tag))) => Some(cx.host.create_element(tag)),
        (None, _) => None,
    };
    if let Some(node) = &created {
        update_dom(
            &mut *cx.host,
            node,
            &Props::new(),
            &fiber.props,
            &cx.config.event_prefix,
        );
    }
    let children = fiber.props.children().to_vec();

    if let Some(node) = created {
        if let Some(fiber) = cx.fibers.get_mut(id) {
            fiber.dom = Some(node);
        }
    }
    reconcile_children(cx, id, &children);
}

fn update_component<H: Host>(
    cx: &mut WorkContext<'_, H>,
    id: FiberId,
    component: &Component,
) -> Result<()> {
    let Some(fiber) = cx.fibers.get(id) else {
        return Ok(());
    };

    let previous = fiber
        .alternate
        .and_then(|alternate| cx.fibers.get(alternate))
        .map(|alternate| alternate.hooks.iter().map(Hook::snapshot).collect());
    let frame = HookFrame::new(
        Arc::from(component.name()),
        previous,
        Arc::clone(cx.updates),
        cx.config.validate_hooks,
    );

    let scope = HookScope::enter(frame);
    let child = component.render(&fiber.props);
    let hooks = scope.finish()?;

    if let Some(fiber) = cx.fibers.get_mut(id) {
        fiber.hooks = hooks;
    }
    reconcile_children(cx, id, &[child]);
    Ok(())
}
