//! Statement parsing, including assignment targets and right-hand sides.

use bumpalo::collections::Vec as BVec;
use wacc_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::expr::Expr;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse `stat (';' stat)*`. A single statement is returned unwrapped.
    pub fn parse_stmt_seq(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let first = self.parse_statement()?;
        if !self.check(TokenKind::Semicolon) {
            return Ok(first);
        }

        let mut stmts = BVec::new_in(self.arena);
        stmts.push(first);
        while self.eat(TokenKind::Semicolon).is_some() {
            stmts.push(self.parse_statement()?);
        }
        let span = first.span().merge(self.previous_span());
        Ok(Stmt::Seq(SeqStmt {
            stmts: self.alloc_slice(stmts),
            span,
        }))
    }

    /// Parse a single statement, dispatching on the current token.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::Skip => {
                self.advance();
                Ok(Stmt::Skip(token.span))
            }
            TokenKind::Read => {
                self.advance();
                let lhs = self.parse_lhs()?;
                Ok(Stmt::Read(ReadStmt {
                    lhs,
                    span: token.span.merge(lhs.span()),
                }))
            }
            TokenKind::Free => Ok(Stmt::Free(self.parse_expr_stmt()?)),
            TokenKind::Return => Ok(Stmt::Return(self.parse_expr_stmt()?)),
            TokenKind::Exit => Ok(Stmt::Exit(self.parse_expr_stmt()?)),
            TokenKind::Print => Ok(Stmt::Print(self.parse_expr_stmt()?)),
            TokenKind::Println => Ok(Stmt::Println(self.parse_expr_stmt()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Begin => {
                self.advance();
                let body = self.parse_stmt_seq()?;
                let end = self.expect(TokenKind::End)?.span;
                Ok(Stmt::Block(self.arena.alloc(BlockStmt {
                    body,
                    span: token.span.merge(end),
                })))
            }
            kind if kind.is_type_start() => self.parse_decl(),
            TokenKind::Identifier | TokenKind::Fst | TokenKind::Snd => self.parse_assign(),
            _ => {
                let mut error = self.unexpected("a statement");
                if error.kind == ParseErrorKind::ExpectedToken {
                    error.kind = ParseErrorKind::ExpectedStatement;
                }
                Err(error)
            }
        }
    }

    /// `keyword expr`
    fn parse_expr_stmt(&mut self) -> Result<ExprStmt<'ast>, ParseError> {
        let start = self.advance().span;
        let expr = self.parse_expr(0)?;
        Ok(ExprStmt {
            expr,
            span: start.merge(expr.span()),
        })
    }

    /// `'if' expr 'then' stat 'else' stat 'fi'`
    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::If)?.span;
        let cond = self.parse_expr(0)?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_stmt_seq()?;
        self.expect(TokenKind::Else)?;
        let else_branch = self.parse_stmt_seq()?;
        let end = self.expect(TokenKind::Fi)?.span;

        Ok(Stmt::If(self.arena.alloc(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: start.merge(end),
        })))
    }

    /// `'while' expr 'do' stat 'done'`
    fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::While)?.span;
        let cond = self.parse_expr(0)?;
        self.expect(TokenKind::Do)?;
        let body = self.parse_stmt_seq()?;
        let end = self.expect(TokenKind::Done)?.span;

        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            cond,
            body,
            span: start.merge(end),
        })))
    }

    /// `type ident '=' rhs`
    fn parse_decl(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let ty = self.parse_type()?;
        let ident = self.expect_ident()?;
        self.expect(TokenKind::Equal)?;
        let rhs = self.parse_rhs()?;

        Ok(Stmt::Decl(self.arena.alloc(DeclStmt {
            ty,
            ident,
            rhs,
            span: ty.span().merge(rhs.span()),
        })))
    }

    /// `lhs '=' rhs`
    fn parse_assign(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let lhs = self.parse_lhs()?;
        self.expect(TokenKind::Equal)?;
        let rhs = self.parse_rhs()?;

        Ok(Stmt::Assign(self.arena.alloc(AssignStmt {
            lhs,
            rhs,
            span: lhs.span().merge(rhs.span()),
        })))
    }

    fn parse_lhs(&mut self) -> Result<AssignLhs<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::Fst | TokenKind::Snd => Ok(AssignLhs::PairElem(self.parse_pair_elem()?)),
            _ => {
                let ident = self.expect_ident()?;
                if self.check(TokenKind::LeftBracket) {
                    Ok(AssignLhs::ArrayElem(self.parse_array_elem(ident)?))
                } else {
                    Ok(AssignLhs::Ident(ident))
                }
            }
        }
    }

    fn parse_rhs(&mut self) -> Result<AssignRhs<'ast>, ParseError> {
        let token = *self.peek();
        match token.kind {
            TokenKind::LeftBracket => {
                self.advance();
                let elems = self.parse_expr_list(TokenKind::RightBracket)?;
                let end = self.expect(TokenKind::RightBracket)?.span;
                Ok(AssignRhs::ArrayLiter(ArrayLiter {
                    elems,
                    span: token.span.merge(end),
                }))
            }
            TokenKind::Newpair => {
                self.advance();
                self.expect(TokenKind::LeftParen)?;
                let fst = self.parse_expr(0)?;
                self.expect(TokenKind::Comma)?;
                let snd = self.parse_expr(0)?;
                let end = self.expect(TokenKind::RightParen)?.span;
                Ok(AssignRhs::NewPair(self.arena.alloc(NewPair {
                    fst,
                    snd,
                    span: token.span.merge(end),
                })))
            }
            TokenKind::Fst | TokenKind::Snd => Ok(AssignRhs::PairElem(self.parse_pair_elem()?)),
            TokenKind::Call => {
                self.advance();
                let ident = self.expect_ident()?;
                self.expect(TokenKind::LeftParen)?;
                let args = self.parse_expr_list(TokenKind::RightParen)?;
                let end = self.expect(TokenKind::RightParen)?.span;
                Ok(AssignRhs::Call(self.arena.alloc(CallExpr {
                    ident,
                    args,
                    span: token.span.merge(end),
                })))
            }
            _ => Ok(AssignRhs::Expr(self.parse_expr(0)?)),
        }
    }

    /// `fst expr` / `snd expr`
    fn parse_pair_elem(&mut self) -> Result<&'ast PairElem<'ast>, ParseError> {
        let token = self.advance();
        let side = match token.kind {
            TokenKind::Fst => PairSide::Fst,
            _ => PairSide::Snd,
        };
        let expr = self.parse_expr(0)?;
        Ok(self.arena.alloc(PairElem {
            side,
            expr,
            span: token.span.merge(expr.span()),
        }))
    }

    /// Comma-separated expressions up to (not including) `close`.
    fn parse_expr_list(&mut self, close: TokenKind) -> Result<&'ast [&'ast Expr<'ast>], ParseError> {
        let mut exprs = BVec::new_in(self.arena);
        if !self.check(close) {
            exprs.push(self.parse_expr(0)?);
            while self.eat(TokenKind::Comma).is_some() {
                exprs.push(self.parse_expr(0)?);
            }
        }
        Ok(self.alloc_slice(exprs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    fn parse<'a>(source: &str, arena: &'a Bump) -> Stmt<'a> {
        Parser::statement(source, arena).unwrap()
    }

    #[test]
    fn sequence_is_flattened() {
        let arena = Bump::new();
        let Stmt::Seq(seq) = parse("skip; print 1; println 'c'", &arena) else {
            panic!("expected sequence");
        };
        assert_eq!(seq.stmts.len(), 3);
        assert!(matches!(seq.stmts[2], Stmt::Println(_)));
    }

    #[test]
    fn single_statement_is_not_wrapped() {
        let arena = Bump::new();
        assert!(matches!(parse("exit 3", &arena), Stmt::Exit(_)));
    }

    #[test]
    fn if_and_while() {
        let arena = Bump::new();
        let Stmt::If(stmt) = parse("if x then skip else print 1; print 2 fi", &arena) else {
            panic!("expected if");
        };
        assert!(matches!(stmt.else_branch, Stmt::Seq(s) if s.stmts.len() == 2));

        let Stmt::While(stmt) = parse("while i < 10 do i = i + 1 done", &arena) else {
            panic!("expected while");
        };
        assert!(matches!(stmt.body, Stmt::Assign(_)));
    }

    #[test]
    fn nested_block() {
        let arena = Bump::new();
        let Stmt::Block(block) = parse("begin int x = 1; print x end", &arena) else {
            panic!("expected block");
        };
        assert!(matches!(block.body, Stmt::Seq(_)));
    }

    #[test]
    fn assignment_targets() {
        let arena = Bump::new();
        assert!(matches!(parse("x = 1", &arena), Stmt::Assign(a) if matches!(a.lhs, AssignLhs::Ident(_))));
        assert!(matches!(parse("a[1] = 1", &arena), Stmt::Assign(a) if matches!(a.lhs, AssignLhs::ArrayElem(_))));
        assert!(matches!(parse("fst p = 1", &arena), Stmt::Assign(a) if matches!(a.lhs, AssignLhs::PairElem(_))));
        assert!(matches!(parse("read snd p", &arena), Stmt::Read(r) if matches!(r.lhs, AssignLhs::PairElem(_))));
    }

    #[test]
    fn right_hand_sides() {
        let arena = Bump::new();
        let rhs = |source: &str| match Parser::statement(source, &arena).unwrap() {
            Stmt::Decl(decl) => decl.rhs,
            other => panic!("expected declaration, got {other:?}"),
        };
        assert!(matches!(rhs("int[] a = [1, 2, 3]"), AssignRhs::ArrayLiter(a) if a.elems.len() == 3));
        assert!(matches!(rhs("int[] a = []"), AssignRhs::ArrayLiter(a) if a.elems.is_empty()));
        assert!(matches!(rhs("pair(int, int) p = newpair(1, 2)"), AssignRhs::NewPair(_)));
        assert!(matches!(rhs("int x = snd p"), AssignRhs::PairElem(e) if e.side == PairSide::Snd));
        assert!(matches!(rhs("int x = call f()"), AssignRhs::Call(c) if c.args.is_empty()));
        assert!(matches!(rhs("int x = call f(1, y)"), AssignRhs::Call(c) if c.args.len() == 2));
    }

    #[test]
    fn unknown_statement() {
        let arena = Bump::new();
        let errors = Parser::statement("then", &arena).unwrap_err();
        assert_eq!(errors.iter().next().unwrap().kind, ParseErrorKind::ExpectedStatement);
    }

    #[test]
    fn missing_fi() {
        let arena = Bump::new();
        assert!(Parser::statement("if true then skip else skip", &arena).is_err());
    }
}
