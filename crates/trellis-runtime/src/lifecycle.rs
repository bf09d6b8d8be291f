//! Synchronous lifecycle dispatch
//!
//! Free functions driving an instance through its lifecycle. The base
//! prototype's plumbing methods delegate here, so a spec-supplied
//! `updateComponent` override still takes effect: updates are dispatched
//! through the instance, not called directly.

use std::rc::Rc;

use trellis_core::{Instance, SpecError, SpecResult, Value};

fn receiver<'a>(recv: Option<&'a Rc<Instance>>) -> SpecResult<&'a Rc<Instance>> {
    recv.ok_or_else(|| SpecError::runtime("framework method called without a receiver"))
}

/// Invoke `name` on the instance if it resolves to a callable, else no-op.
fn maybe_call(instance: &Rc<Instance>, name: &str, args: &[Value]) -> SpecResult<Value> {
    match instance.get(name)? {
        Some(hook) if hook.is_callable() => hook.call(Some(instance), args),
        _ => Ok(Value::Null),
    }
}

/// Invoke the instance's `render` hook.
pub fn render(instance: &Rc<Instance>) -> SpecResult<Value> {
    instance.call_method("render", &[])
}

/// Mount: `componentWillMount`, `render`, `componentDidMount`.
///
/// Returns the render output.
pub fn mount(instance: &Rc<Instance>) -> SpecResult<Value> {
    maybe_call(instance, "componentWillMount", &[])?;
    let output = render(instance)?;
    instance.set_mounted(true);
    maybe_call(instance, "componentDidMount", &[])?;
    Ok(output)
}

/// Unmount: `componentWillUnmount`, then mark unmounted.
pub fn unmount(instance: &Rc<Instance>) -> SpecResult<()> {
    maybe_call(instance, "componentWillUnmount", &[])?;
    instance.set_mounted(false);
    Ok(())
}

/// Update: `componentWillUpdate`, apply next props (if any), `render`,
/// `componentDidUpdate`.
///
/// Returns the render output.
pub fn perform_update(instance: &Rc<Instance>, next_props: Option<Value>) -> SpecResult<Value> {
    let prev_props = instance.props();
    let prev_state = instance.state();
    let next_props = next_props.unwrap_or_else(|| prev_props.clone());

    maybe_call(
        instance,
        "componentWillUpdate",
        &[next_props.clone(), instance.state()],
    )?;
    instance.set_props(next_props);
    let output = render(instance)?;
    maybe_call(instance, "componentDidUpdate", &[prev_props, prev_state])?;
    Ok(output)
}

/// Receive new props: `componentWillReceiveProps`, then update unless
/// `shouldComponentUpdate` vetoes it.
pub fn receive_props(instance: &Rc<Instance>, next_props: Value) -> SpecResult<Value> {
    maybe_call(instance, "componentWillReceiveProps", &[next_props.clone()])?;

    let should_update = match instance.get("shouldComponentUpdate")? {
        Some(gate) if gate.is_callable() => gate
            .call(Some(instance), &[next_props.clone(), instance.state()])?
            .as_bool()
            .unwrap_or(true),
        _ => true,
    };
    if !should_update {
        instance.set_props(next_props);
        return Ok(Value::Null);
    }
    instance.call_method("updateComponent", &[next_props])
}

/// Merge a partial state map into the instance state and re-render if
/// mounted.
pub fn set_state(instance: &Rc<Instance>, partial: &Value) -> SpecResult<Value> {
    merge_into_state(instance, partial)?;
    if instance.is_mounted() {
        return instance.call_method("updateComponent", &[]);
    }
    Ok(Value::Null)
}

fn merge_into_state(instance: &Rc<Instance>, partial: &Value) -> SpecResult<()> {
    if partial.is_null() {
        return Ok(());
    }
    let partial = partial
        .as_map()
        .ok_or_else(|| SpecError::runtime("state updates must be objects"))?;

    let state = instance.state();
    let merged = match state.as_map() {
        Some(current) => {
            let mut merged = current.borrow().clone();
            for (key, value) in partial.borrow().iter() {
                merged.insert(key.clone(), value.clone());
            }
            Value::map(merged)
        }
        None => Value::map(partial.borrow().clone()),
    };
    instance.replace_state(merged);
    Ok(())
}

// Base prototype method bodies. Installed by the runtime; dispatching
// through the instance keeps override-base redefinitions effective.

pub(crate) fn base_set_state(
    recv: Option<&Rc<Instance>>,
    args: &[Value],
) -> SpecResult<Value> {
    let instance = receiver(recv)?;
    let partial = args.first().cloned().unwrap_or(Value::Null);
    let output = set_state(instance, &partial)?;
    if let Some(callback) = args.get(1) {
        if callback.is_callable() {
            callback.call(Some(instance), &[])?;
        }
    }
    Ok(output)
}

pub(crate) fn base_replace_state(
    recv: Option<&Rc<Instance>>,
    args: &[Value],
) -> SpecResult<Value> {
    let instance = receiver(recv)?;
    instance.replace_state(args.first().cloned().unwrap_or(Value::Null));
    if instance.is_mounted() {
        return instance.call_method("updateComponent", &[]);
    }
    Ok(Value::Null)
}

pub(crate) fn base_force_update(
    recv: Option<&Rc<Instance>>,
    args: &[Value],
) -> SpecResult<Value> {
    let instance = receiver(recv)?;
    let output = instance.call_method("updateComponent", &[])?;
    if let Some(callback) = args.first() {
        if callback.is_callable() {
            callback.call(Some(instance), &[])?;
        }
    }
    Ok(output)
}

pub(crate) fn base_is_mounted(recv: Option<&Rc<Instance>>, _args: &[Value]) -> SpecResult<Value> {
    Ok(Value::Bool(receiver(recv)?.is_mounted()))
}

pub(crate) fn base_mount_component(
    recv: Option<&Rc<Instance>>,
    _args: &[Value],
) -> SpecResult<Value> {
    mount(receiver(recv)?)
}

pub(crate) fn base_unmount_component(
    recv: Option<&Rc<Instance>>,
    _args: &[Value],
) -> SpecResult<Value> {
    unmount(receiver(recv)?)?;
    Ok(Value::Null)
}

pub(crate) fn base_receive_component(
    recv: Option<&Rc<Instance>>,
    args: &[Value],
) -> SpecResult<Value> {
    let instance = receiver(recv)?;
    receive_props(instance, args.first().cloned().unwrap_or(Value::Null))
}

pub(crate) fn base_update_component(
    recv: Option<&Rc<Instance>>,
    args: &[Value],
) -> SpecResult<Value> {
    perform_update(receiver(recv)?, args.first().cloned())
}

pub(crate) fn base_perform_update_if_necessary(
    recv: Option<&Rc<Instance>>,
    _args: &[Value],
) -> SpecResult<Value> {
    let instance = receiver(recv)?;
    instance.call_method("updateComponent", &[])
}
