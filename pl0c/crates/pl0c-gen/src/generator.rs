//! AST to LLVM IR.
//!
//! Walks a [`pl0c_par::Program`] and drives `inkwell` directly against an
//! `inkwell::context::Context`, producing a verified `Module`. This is the
//! concrete choice spec.md §1 leaves abstract ("whether the implementation
//! writes IR text directly or drives a native binding is a free choice").

use std::collections::HashMap;

use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::values::{BasicMetadataValueEnum, FunctionValue, GlobalValue, IntValue, PointerValue};
use inkwell::{AddressSpace, IntPredicate};

use pl0c_lex::Operator;
use pl0c_par::{Condition, Consts, Expression, Procedure, Program, Statement, Subprogram, Vars};
use pl0c_util::Symbol;

use crate::error::{CodeGenError, Result};
use crate::scope::Locals;

fn llvm_err(e: impl std::fmt::Display) -> CodeGenError {
    CodeGenError::LlvmOperationFailed(e.to_string())
}

/// Flattens every procedure reachable from `subprogram`, however deeply
/// nested, into declaration order. Every procedure becomes a top-level
/// LLVM function regardless of where it was textually declared
/// (spec.md §3's flat global symbol space).
fn collect_procedures<'ast>(subprogram: &'ast Subprogram, out: &mut Vec<&'ast Procedure>) {
    for procedure in &subprogram.procedures {
        out.push(procedure);
        collect_procedures(&procedure.body, out);
    }
}

/// Drives one [`Program`]'s worth of IR emission against a single LLVM
/// module. Owns the module from creation through verification; per spec.md
/// §5, it is never shared across stages.
pub struct Generator<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    /// Every top-level `const`/`var`, keyed by name - the third and
    /// outermost namespace in spec.md §4.3's scope model.
    module_globals: HashMap<Symbol, GlobalValue<'ctx>>,
    printf_fn: FunctionValue<'ctx>,
    scanf_fn: FunctionValue<'ctx>,
}

impl<'ctx> Generator<'ctx> {
    /// Lowers `program` into a verified LLVM module named `module_name`.
    pub fn generate(context: &'ctx Context, module_name: &str, program: &Program) -> Result<Module<'ctx>> {
        let mut generator = Self::new(context, module_name);
        generator.emit_program(program)?;
        generator
            .module
            .verify()
            .map_err(|e| CodeGenError::VerificationFailed(e.to_string()))?;
        Ok(generator.module)
    }

    fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);

        let i8_ptr = context.ptr_type(AddressSpace::default());
        let i32_ty = context.i32_type();
        let varargs_fn = i32_ty.fn_type(&[i8_ptr.into()], true);

        let printf_fn = module.add_function("printf", varargs_fn, Some(Linkage::External));
        let scanf_fn = module.add_function("scanf", varargs_fn, Some(Linkage::External));

        Self {
            context,
            module,
            module_globals: HashMap::new(),
            printf_fn,
            scanf_fn,
        }
    }

    fn emit_program(&mut self, program: &Program) -> Result<()> {
        self.emit_globals(&program.subprogram)?;

        let mut procedures = Vec::new();
        collect_procedures(&program.subprogram, &mut procedures);
        self.declare_procedures(&procedures)?;
        self.define_procedures(&procedures)?;

        let main_ty = self.context.void_type().fn_type(&[], false);
        let main_fn = self.module.add_function("main", main_ty, None);
        let entry = self.context.append_basic_block(main_fn, "entry");
        let builder = self.context.create_builder();
        builder.position_at_end(entry);

        let locals = Locals::empty();
        if let Some(statement) = &program.subprogram.statement {
            self.emit_statement(statement, main_fn, &builder, &locals)?;
        }
        builder.build_return(None).map_err(llvm_err)?;

        Ok(())
    }

    /// One global-constant definition per declared constant, one
    /// zero-initialized mutable global per declared variable - both at the
    /// top level only (spec.md §3, §8's testable module-shape properties).
    fn emit_globals(&mut self, subprogram: &Subprogram) -> Result<()> {
        let i64_ty = self.context.i64_type();

        if let Some(Consts(entries)) = &subprogram.consts {
            for (name, value) in entries {
                let global = self.module.add_global(i64_ty, None, name.as_str());
                global.set_constant(true);
                global.set_initializer(&i64_ty.const_int(*value as u64, true));
                self.module_globals.insert(*name, global);
            }
        }

        if let Some(Vars(names)) = &subprogram.vars {
            for name in names {
                let global = self.module.add_global(i64_ty, None, name.as_str());
                global.set_initializer(&i64_ty.const_int(0, false));
                self.module_globals.insert(*name, global);
            }
        }

        Ok(())
    }

    /// Forward-declares every procedure before any body is emitted, so a
    /// `call` to a procedure declared later in the source (or to itself,
    /// recursively) resolves during body emission.
    fn declare_procedures(&mut self, procedures: &[&Procedure]) -> Result<()> {
        let void_fn = self.context.void_type().fn_type(&[], false);
        for procedure in procedures {
            if self.module.get_function(procedure.name.as_str()).is_none() {
                self.module.add_function(procedure.name.as_str(), void_fn, None);
            }
        }
        Ok(())
    }

    fn define_procedures(&mut self, procedures: &[&Procedure]) -> Result<()> {
        for procedure in procedures {
            let function = self
                .module
                .get_function(procedure.name.as_str())
                .expect("procedure was declared in the forward-declaration pass");

            // A duplicate declaration (the same name reused) defines only
            // the first occurrence's body - duplicate globals are left for
            // the emitting backend to reject, per spec.md §3.
            if function.get_first_basic_block().is_some() {
                continue;
            }

            let entry = self.context.append_basic_block(function, "entry");
            let builder = self.context.create_builder();
            builder.position_at_end(entry);

            let locals = self.build_locals(&procedure.body, &builder)?;
            if let Some(statement) = &procedure.body.statement {
                self.emit_statement(statement, function, &builder, &locals)?;
            }
            builder.build_return(None).map_err(llvm_err)?;
        }
        Ok(())
    }

    /// Builds a fresh [`Locals`] for one subprogram body: inline values for
    /// its own `const`s, stack allocas for its own `var`s. Never inherits an
    /// enclosing procedure's locals (spec.md §9's flat-scope design note).
    fn build_locals(&self, subprogram: &Subprogram, builder: &inkwell::builder::Builder<'ctx>) -> Result<Locals<'ctx>> {
        let i64_ty = self.context.i64_type();
        let mut locals = Locals::empty();

        if let Some(Consts(entries)) = &subprogram.consts {
            for (name, value) in entries {
                locals.consts.insert(*name, i64_ty.const_int(*value as u64, true));
            }
        }

        if let Some(Vars(names)) = &subprogram.vars {
            for name in names {
                let ptr = builder.build_alloca(i64_ty, name.as_str()).map_err(llvm_err)?;
                locals.vars.insert(*name, ptr);
            }
        }

        Ok(locals)
    }

    fn emit_statement(
        &self,
        statement: &Statement,
        function: FunctionValue<'ctx>,
        builder: &inkwell::builder::Builder<'ctx>,
        locals: &Locals<'ctx>,
    ) -> Result<()> {
        match statement {
            Statement::Assign(name, expr, _) => {
                let value = self.emit_expression(expr, builder, locals)?;
                let ptr = self.resolve_store_target(*name, locals)?;
                builder.build_store(ptr, value).map_err(llvm_err)?;
            }
            Statement::Call(name, _) => {
                let function = self
                    .module
                    .get_function(name.as_str())
                    .ok_or_else(|| CodeGenError::FunctionUndefined(name.to_string()))?;
                builder.build_call(function, &[], "calltmp").map_err(llvm_err)?;
            }
            Statement::If(condition, body, _) => {
                let cond_value = self.emit_condition(condition, builder, locals)?;
                let then_block = self.context.append_basic_block(function, "if.then");
                let merge_block = self.context.append_basic_block(function, "if.end");

                builder
                    .build_conditional_branch(cond_value, then_block, merge_block)
                    .map_err(llvm_err)?;

                builder.position_at_end(then_block);
                if let Some(body) = body {
                    self.emit_statement(body, function, builder, locals)?;
                }
                builder.build_unconditional_branch(merge_block).map_err(llvm_err)?;

                builder.position_at_end(merge_block);
            }
            Statement::While(condition, body, _) => {
                // Block names mirror spec.md §4.3's `<parent>.whilecondition`/
                // `.whilethen`/`.endwhile` convention.
                let parent_name = builder
                    .get_insert_block()
                    .and_then(|b| b.get_name().to_str().ok().map(str::to_owned))
                    .unwrap_or_else(|| "bb".to_string());

                let cond_block = self
                    .context
                    .append_basic_block(function, &format!("{parent_name}.whilecondition"));
                let then_block = self
                    .context
                    .append_basic_block(function, &format!("{parent_name}.whilethen"));
                let end_block = self
                    .context
                    .append_basic_block(function, &format!("{parent_name}.endwhile"));

                builder.build_unconditional_branch(cond_block).map_err(llvm_err)?;

                builder.position_at_end(cond_block);
                let cond_value = self.emit_condition(condition, builder, locals)?;
                builder
                    .build_conditional_branch(cond_value, then_block, end_block)
                    .map_err(llvm_err)?;

                builder.position_at_end(then_block);
                if let Some(body) = body {
                    self.emit_statement(body, function, builder, locals)?;
                }
                builder.build_unconditional_branch(cond_block).map_err(llvm_err)?;

                builder.position_at_end(end_block);
            }
            Statement::Compound(statements, _) => {
                for statement in statements {
                    self.emit_statement(statement, function, builder, locals)?;
                }
            }
            Statement::Write(expressions, _) => {
                let mut values = Vec::with_capacity(expressions.len());
                for expression in expressions {
                    values.push(self.emit_expression(expression, builder, locals)?);
                }

                let format_ptr = self.build_format_string(builder, values.len(), true)?;
                let mut args: Vec<BasicMetadataValueEnum> = vec![format_ptr.into()];
                args.extend(values.into_iter().map(BasicMetadataValueEnum::from));

                builder
                    .build_call(self.printf_fn, &args, "printf_call")
                    .map_err(llvm_err)?;
            }
            Statement::Read(names, _) => {
                let mut pointers = Vec::with_capacity(names.len());
                for name in names {
                    pointers.push(self.resolve_store_target(*name, locals)?);
                }

                let format_ptr = self.build_format_string(builder, names.len(), false)?;
                let mut args: Vec<BasicMetadataValueEnum> = vec![format_ptr.into()];
                args.extend(pointers.into_iter().map(BasicMetadataValueEnum::from));

                builder
                    .build_call(self.scanf_fn, &args, "scanf_call")
                    .map_err(llvm_err)?;
            }
        }
        Ok(())
    }

    fn emit_expression(
        &self,
        expression: &Expression,
        builder: &inkwell::builder::Builder<'ctx>,
        locals: &Locals<'ctx>,
    ) -> Result<IntValue<'ctx>> {
        match expression {
            Expression::Number(n, _) => Ok(self.context.i64_type().const_int(*n as u64, true)),
            Expression::Identifier(name, _) => self.resolve_value(*name, builder, locals),
            Expression::Binary(lhs, op, rhs, _) => {
                let lhs = self.emit_expression(lhs, builder, locals)?;
                let rhs = self.emit_expression(rhs, builder, locals)?;
                match op {
                    Operator::Plus => builder.build_int_add(lhs, rhs, "addtmp").map_err(llvm_err),
                    Operator::Minus => builder.build_int_sub(lhs, rhs, "subtmp").map_err(llvm_err),
                    Operator::Star => builder.build_int_mul(lhs, rhs, "multmp").map_err(llvm_err),
                    Operator::Slash => builder.build_int_signed_div(lhs, rhs, "divtmp").map_err(llvm_err),
                    _ => unreachable!("parser never hands a non-arithmetic operator to a Binary expression"),
                }
            }
        }
    }

    fn emit_condition(
        &self,
        condition: &Condition,
        builder: &inkwell::builder::Builder<'ctx>,
        locals: &Locals<'ctx>,
    ) -> Result<IntValue<'ctx>> {
        match condition {
            // Truncation to i1 on signed i64 yields the low bit - "is the
            // absolute value odd" for negative inputs too. Preserved per
            // spec.md §9's explicit instruction.
            Condition::Odd(expr, _) => {
                let value = self.emit_expression(expr, builder, locals)?;
                builder
                    .build_int_truncate(value, self.context.bool_type(), "oddtmp")
                    .map_err(llvm_err)
            }
            Condition::Binary(lhs, op, rhs, _) => {
                let lhs = self.emit_expression(lhs, builder, locals)?;
                let rhs = self.emit_expression(rhs, builder, locals)?;
                let predicate = match op {
                    Operator::Eq => IntPredicate::EQ,
                    Operator::NotEq => IntPredicate::NE,
                    Operator::Less => IntPredicate::SLT,
                    Operator::LessEq => IntPredicate::SLE,
                    Operator::Greater => IntPredicate::SGT,
                    Operator::GreaterEq => IntPredicate::SGE,
                    _ => unreachable!("parser never hands a non-relational operator to a Binary condition"),
                };
                builder
                    .build_int_compare(predicate, lhs, rhs, "cmptmp")
                    .map_err(llvm_err)
            }
        }
    }

    /// Resolves `name` for a *read* position: local consts first (inline
    /// value, no load), then local vars, then module globals - spec.md
    /// §4.3's three-namespace order.
    fn resolve_value(
        &self,
        name: Symbol,
        builder: &inkwell::builder::Builder<'ctx>,
        locals: &Locals<'ctx>,
    ) -> Result<IntValue<'ctx>> {
        if let Some(value) = locals.consts.get(&name) {
            return Ok(*value);
        }
        if let Some(ptr) = locals.vars.get(&name) {
            return builder
                .build_load(self.context.i64_type(), *ptr, "loadtmp")
                .map_err(llvm_err)
                .map(|v| v.into_int_value());
        }
        if let Some(global) = self.module_globals.get(&name) {
            return builder
                .build_load(self.context.i64_type(), global.as_pointer_value(), "loadtmp")
                .map_err(llvm_err)
                .map(|v| v.into_int_value());
        }
        Err(CodeGenError::VariableUndefined(name.to_string()))
    }

    /// Resolves `name` for a *write* position (an assignment target or a
    /// `read` target): vars first, then globals, constants rejected either
    /// way. This is spec.md §9's corrected two-namespace order - the
    /// original's `read` bypassed locals and went straight to module
    /// globals, which this crate deliberately does not reproduce (see
    /// DESIGN.md).
    fn resolve_store_target(&self, name: Symbol, locals: &Locals<'ctx>) -> Result<PointerValue<'ctx>> {
        if let Some(ptr) = locals.vars.get(&name) {
            return Ok(*ptr);
        }
        if locals.consts.contains_key(&name) {
            return Err(CodeGenError::VariableUndefined(name.to_string()));
        }
        if let Some(global) = self.module_globals.get(&name) {
            if global.is_constant() {
                return Err(CodeGenError::VariableUndefined(name.to_string()));
            }
            return Ok(global.as_pointer_value());
        }
        Err(CodeGenError::VariableUndefined(name.to_string()))
    }

    /// Builds the `"%i %i … %i\n\0"` (write) or `"%i %i … %i\0"` (read)
    /// format string as a stack-allocated array, per spec.md §4.3, and
    /// returns a pointer to it.
    fn build_format_string(
        &self,
        builder: &inkwell::builder::Builder<'ctx>,
        arity: usize,
        trailing_newline: bool,
    ) -> Result<PointerValue<'ctx>> {
        let mut text = vec!["%i"; arity].join(" ");
        if trailing_newline {
            text.push('\n');
        }

        let constant = self.context.const_string(text.as_bytes(), true);
        let alloca = builder.build_alloca(constant.get_type(), "fmt").map_err(llvm_err)?;
        builder.build_store(alloca, constant).map_err(llvm_err)?;
        Ok(alloca)
    }

    /// The module's textual IR, for `-v`/`--verbose` (spec.md §6).
    pub fn ir_text(module: &Module<'ctx>) -> String {
        module.print_to_string().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::context::Context;
    use pl0c_lex::Lexer;
    use pl0c_par::Parser;

    fn compile(source: &str) -> Module<'static> {
        let context = Box::leak(Box::new(Context::create()));
        let tokens = Lexer::new(source).tokenize();
        let program = Parser::new(&tokens).parse_program().expect("parse failed");
        Generator::generate(context, "test", &program).expect("codegen failed")
    }

    #[test]
    fn emits_one_global_per_const_and_var() {
        let module = compile("const num=100; var a1,b2; begin read(a1); b2:=a1+num; write(a1,b2); end.");
        assert!(module.get_global("num").is_some());
        assert!(module.get_global("a1").is_some());
        assert!(module.get_global("b2").is_some());
        assert!(module.get_global("num").unwrap().is_constant());
        assert!(!module.get_global("a1").unwrap().is_constant());
    }

    #[test]
    fn call_target_becomes_a_declared_function() {
        let module = compile("var x, squ; procedure square; begin squ:=x*x; end begin call square; end.");
        assert!(module.get_function("square").is_some());
    }

    #[test]
    fn nested_procedure_becomes_a_top_level_function() {
        let source = "
            var x, y;
            procedure outer;
            var z;
            procedure inner;
            begin
                z := 1;
            end
            begin
                call inner;
            end
            begin call outer; end.
        ";
        let module = compile(source);
        assert!(module.get_function("outer").is_some());
        assert!(module.get_function("inner").is_some());
    }

    #[test]
    fn while_loop_uses_labeled_basic_blocks() {
        let module = compile("var x; begin x:=1; while x<=10 do x:=x+1; end.");
        let ir = Generator::ir_text(&module);
        assert!(ir.contains("whilecondition"));
        assert!(ir.contains("whilethen"));
        assert!(ir.contains("endwhile"));
    }

    #[test]
    fn assigning_to_a_constant_is_an_error() {
        let tokens = Lexer::new("const a=1; begin a:=2; end.").tokenize();
        let program = Parser::new(&tokens).parse_program().expect("parse failed");
        let context = Context::create();
        let err = Generator::generate(&context, "test", &program).unwrap_err();
        assert!(matches!(err, CodeGenError::VariableUndefined(name) if name == "a"));
    }

    #[test]
    fn call_of_undeclared_procedure_is_an_error() {
        let tokens = Lexer::new("begin call nope; end.").tokenize();
        let program = Parser::new(&tokens).parse_program().expect("parse failed");
        let context = Context::create();
        let err = Generator::generate(&context, "test", &program).unwrap_err();
        assert!(matches!(err, CodeGenError::FunctionUndefined(name) if name == "nope"));
    }

    #[test]
    fn undefined_identifier_in_expression_is_an_error() {
        let tokens = Lexer::new("begin write(unknown); end.").tokenize();
        let program = Parser::new(&tokens).parse_program().expect("parse failed");
        let context = Context::create();
        let err = Generator::generate(&context, "test", &program).unwrap_err();
        assert!(matches!(err, CodeGenError::VariableUndefined(name) if name == "unknown"));
    }

    #[test]
    fn read_target_resolves_through_locals_not_just_globals() {
        // A procedure-local var as a `read` target must resolve via the
        // local alloca - spec.md §9's corrected read-scope chain, not the
        // original's global-only lookup.
        let module = compile("procedure p; var a; begin read(a); end begin call p; end.");
        assert!(Generator::ir_text(&module).contains("define void @p"));
    }

    #[test]
    fn verification_succeeds_on_a_multi_procedure_program() {
        let source = "
            var x, y, z, q, r;
            procedure gcd;
            begin
                while x # y do
                begin
                    if x < y then y := y - x;
                    if y < x then x := x - y;
                end
                z := x;
            end
            begin
                read(x); read(y); call gcd; write(z);
            end.
        ";
        // `compile` already asserts `Module::verify()` succeeded internally.
        let module = compile(source);
        assert!(module.get_function("main").is_some());
    }
}
