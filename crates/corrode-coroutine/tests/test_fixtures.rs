//! Shared fixtures: an in-memory debuggee with the coroutine runtime's
//! base types and helpers to build continuation chains.

use crate::backend::{
    DebugBackend, LocalVariable, ObjectId, PhysicalFrame, ThreadId, TypeId, Value, WellKnownTypes,
};
use crate::context::ExecutionContext;
use crate::memory::InMemoryProcess;
use crate::metadata::RawDebugMetadata;
use crate::options::ReconstructionOptions;
use smallvec::smallvec;

pub const SOURCE_FILE: &str = "app.kt";

pub struct Runtime {
    pub process: InMemoryProcess,
    pub options: ReconstructionOptions,
    pub any: TypeId,
    pub continuation: TypeId,
    pub base_continuation: TypeId,
    pub continuation_impl: TypeId,
    pub suspend_lambda: TypeId,
    pub coroutine: TypeId,
}

impl Runtime {
    pub fn new() -> Self {
        let mut process = InMemoryProcess::new();
        let any = process.add_type("kotlin.Any", &[]);
        let continuation = process.add_type("kotlin.coroutines.Continuation", &[any]);
        let base_continuation =
            process.add_type("kotlin.coroutines.jvm.internal.BaseContinuationImpl", &[any, continuation]);
        let continuation_impl =
            process.add_type("kotlin.coroutines.jvm.internal.ContinuationImpl", &[base_continuation]);
        let suspend_lambda =
            process.add_type("kotlin.coroutines.jvm.internal.SuspendLambda", &[continuation_impl]);
        let coroutine = process.add_type("kotlinx.coroutines.StandaloneCoroutine", &[any, continuation]);
        process.well_known = WellKnownTypes {
            base_continuation: Some(base_continuation),
            suspend_lambda: Some(suspend_lambda),
            continuation: Some(continuation),
        };
        Runtime {
            process,
            options: ReconstructionOptions::default(),
            any,
            continuation,
            base_continuation,
            continuation_impl,
            suspend_lambda,
            coroutine,
        }
    }

    pub fn ctx(&self) -> ExecutionContext<'_> {
        ExecutionContext::new(&self.process, &self.process, &self.options)
    }

    /// A continuation of `function` parked at `line`, holding `spilled`.
    pub fn add_continuation(
        &mut self,
        function: &str,
        line: i32,
        spilled: &[(&str, Value)],
        lambda: bool,
    ) -> ObjectId {
        let class_name = format!("app.{function}Kt");
        if self.process.find_type(&class_name).is_none() {
            self.process.add_type(class_name.clone(), &[self.any]);
        }
        let base = if lambda { self.suspend_lambda } else { self.continuation_impl };
        let ty = self.process.add_type(format!("{class_name}${function}$1"), &[base]);

        let fields: Vec<String> = (0..spilled.len()).map(|i| format!("L${i}")).collect();
        self.process.set_debug_metadata(
            ty,
            RawDebugMetadata {
                source_file: SOURCE_FILE.to_string(),
                class_name,
                method_name: function.to_string(),
                line_numbers: vec![line],
                spilled: fields.clone(),
                local_names: spilled.iter().map(|(name, _)| name.to_string()).collect(),
                index_to_label: vec![0; spilled.len()],
            },
        );

        let object = self.process.add_object(ty);
        self.process.set_field(object, "label", Value::Int(1));
        self.process.set_field(object, "completion", Value::Null);
        for (field, (_, value)) in fields.into_iter().zip(spilled) {
            self.process.set_field(object, field, value.clone());
        }
        object
    }

    pub fn add_root(&mut self, name: &str) -> ObjectId {
        let root = self.process.add_object(self.coroutine);
        self.process
            .set_accessor(root, "toString", Value::Str(name.to_string()));
        root
    }

    pub fn link(&mut self, from: ObjectId, to: ObjectId) {
        self.process.set_field(from, "completion", Value::Object(to));
    }

    /// `n` linked continuations, innermost first and a suspend lambda,
    /// completing into a coroutine root. Continuation `i` spills `x{i} = i`
    /// and is parked at line `100 + i`.
    pub fn chain(&mut self, n: usize) -> (Vec<ObjectId>, ObjectId) {
        let links: Vec<ObjectId> = (0..n)
            .map(|i| {
                let local = format!("x{i}");
                self.add_continuation(
                    &format!("step{i}"),
                    100 + i as i32,
                    &[(local.as_str(), Value::Int(i as i64))],
                    i == 0,
                )
            })
            .collect();
        let root = self.add_root("StandaloneCoroutine{Active}");
        for pair in links.windows(2) {
            self.link(pair[0], pair[1]);
        }
        if let Some(&last) = links.last() {
            self.link(last, root);
        }
        (links, root)
    }

    pub fn type_of(&self, object: ObjectId) -> TypeId {
        self.process
            .objects
            .iter()
            .find(|o| o.id == object)
            .map(|o| o.type_id)
            .expect("object should exist")
    }

    /// `invokeSuspend` of `continuation`, as the dispatch loop calls it.
    pub fn boundary_frame(&self, thread: ThreadId, depth: usize, continuation: ObjectId) -> PhysicalFrame {
        let mut frame = InMemoryProcess::frame(thread, depth, self.type_of(continuation), "invokeSuspend", 7);
        frame.source_file = Some(SOURCE_FILE.to_string());
        frame.this_object = Some(continuation);
        frame.locals = vec![LocalVariable {
            name: "$result".to_string(),
            value: Value::Null,
        }];
        frame
    }

    /// A plain frame of a non-coroutine method.
    pub fn plain_frame(&mut self, thread: ThreadId, depth: usize, method: &str) -> PhysicalFrame {
        let ty = match self.process.find_type("app.MainKt") {
            Some(ty) => ty,
            None => self.process.add_type("app.MainKt", &[self.any]),
        };
        InMemoryProcess::frame(thread, depth, ty, method, 1)
    }

    /// `resumeWith` of the runtime's base continuation.
    pub fn resume_with_frame(&self, thread: ThreadId, depth: usize) -> PhysicalFrame {
        InMemoryProcess::frame(thread, depth, self.base_continuation, "resumeWith", 0)
    }

    /// A suspend function frame taking the continuation as last parameter.
    pub fn suspend_function_frame(
        &mut self,
        thread: ThreadId,
        depth: usize,
        continuation: ObjectId,
    ) -> PhysicalFrame {
        let mut frame = self.plain_frame(thread, depth, "fetch");
        frame.method.parameter_types = smallvec![self.any, self.continuation];
        frame.locals = vec![LocalVariable {
            name: "$continuation".to_string(),
            value: Value::Object(continuation),
        }];
        frame
    }
}
