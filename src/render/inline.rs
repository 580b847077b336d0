//! Inline markup translation.
//!
//! Styling is tracked on a stack so nested runs switch to the combined
//! font (`\f[BI]`, `\f[CB]`, ...) and restore the enclosing font when they
//! close. Every run emits exactly one switch on entry and one on exit.

use crate::index::{Lookup, Resolution};
use crate::model::{plain_text, Entity, Inline, LinkTarget, LiteralEntity, MemberKind, Style};

use super::page::PageRenderer;
use super::roff::{escape, macro_arg, Roff};

/// Standard C and POSIX functions referenced as `name(3)` from code spans.
const LIBC_FUNCTIONS: &[&str] = &[
    "abort", "abs", "accept", "access", "acos", "aligned_alloc", "alarm", "asctime", "asin",
    "atan", "atan2", "atexit", "atof", "atoi", "atol", "atoll", "bind", "bsearch", "btowc",
    "calloc", "ceil", "chdir", "chmod", "chown", "clearerr", "clock", "clock_gettime", "close",
    "closedir", "connect", "cos", "creat", "ctime", "difftime", "dirname", "div", "dlclose",
    "dlerror", "dlopen", "dlsym", "dup", "dup2", "execl", "execlp", "execv", "execve", "execvp",
    "exit", "exp", "fabs", "fchmod", "fclose", "fcntl", "fdopen", "feof", "ferror", "fflush",
    "fgetc", "fgetpos", "fgets", "fileno", "floor", "fmod", "fnmatch", "fopen", "fork",
    "fprintf", "fputc", "fputs", "fread", "free", "freopen", "frexp", "fscanf", "fseek",
    "fsetpos", "fstat", "fsync", "ftell", "ftruncate", "fwrite", "getaddrinfo", "getc",
    "getchar", "getcwd", "getenv", "getline", "getpid", "getppid", "gettimeofday", "getuid",
    "glob", "gmtime", "inet_ntop", "inet_pton", "ioctl", "isalnum", "isalpha", "isatty",
    "isblank", "iscntrl", "isdigit", "isgraph", "islower", "isprint", "ispunct", "isspace",
    "isupper", "isxdigit", "kill", "labs", "ldexp", "ldiv", "link", "listen", "llabs",
    "localeconv", "localtime", "log", "log10", "longjmp", "lseek", "lstat", "malloc", "mblen",
    "mbstowcs", "mbtowc", "memchr", "memcmp", "memcpy", "memmove", "memset", "mkdir",
    "mkstemp", "mktime", "mmap", "modf", "munmap", "nanosleep", "open", "opendir", "perror",
    "pipe", "poll", "posix_memalign", "pow", "pread", "printf", "pthread_cond_broadcast",
    "pthread_cond_signal", "pthread_cond_wait", "pthread_create", "pthread_detach",
    "pthread_join", "pthread_mutex_destroy", "pthread_mutex_init", "pthread_mutex_lock",
    "pthread_mutex_unlock", "putc", "putchar", "putenv", "puts", "pwrite", "qsort", "raise",
    "rand", "read", "readdir", "readlink", "realloc", "realpath", "recv", "recvfrom", "remove",
    "rename", "rewind", "rmdir", "scanf", "select", "send", "sendto", "setbuf", "setenv",
    "setjmp", "setlocale", "setsockopt", "setvbuf", "shutdown", "sigaction", "signal", "sin",
    "sleep", "snprintf", "socket", "sprintf", "sqrt", "srand", "sscanf", "stat", "strcasecmp",
    "strcat", "strchr", "strcmp", "strcoll", "strcpy", "strcspn", "strdup", "strerror",
    "strftime", "strlen", "strncasecmp", "strncat", "strncmp", "strncpy", "strndup", "strnlen",
    "strpbrk", "strrchr", "strspn", "strstr", "strtod", "strtof", "strtok", "strtok_r", "strtol",
    "strtold", "strtoll", "strtoul", "strtoull", "strxfrm", "symlink", "sysconf", "system",
    "tan", "time", "timegm", "tmpfile", "tolower", "toupper", "truncate", "umask", "uname",
    "ungetc", "unlink", "unsetenv", "usleep", "va_arg", "va_copy", "va_end", "va_start",
    "vfprintf", "vprintf", "vsnprintf", "vsprintf", "waitpid", "wcslen", "wcstombs", "wctomb",
    "write",
];

fn is_libc_function(name: &str) -> bool {
    LIBC_FUNCTIONS.contains(&name)
}

/// Font name for a style stack. Strikethrough has no font.
fn font(styles: &[Style]) -> &'static str {
    let has = |style: Style| styles.contains(&style);
    match (has(Style::Code), has(Style::Bold), has(Style::Italic)) {
        (false, false, false) => "R",
        (false, true, false) => "B",
        (false, false, true) => "I",
        (false, true, true) => "BI",
        (true, false, false) => "C",
        (true, true, false) => "CB",
        (true, false, true) => "CI",
        (true, true, true) => "CBI",
    }
}

impl<'a> PageRenderer<'a> {
    /// Render inline nodes as running text.
    pub(crate) fn render_inline(&mut self, out: &mut Roff, nodes: &[Inline]) {
        for node in nodes {
            self.render_inline_node(out, node);
        }
    }

    /// Render inline nodes into a fresh buffer.
    pub(crate) fn inline_roff(&mut self, nodes: &[Inline]) -> Roff {
        let mut out = Roff::new();
        self.render_inline(&mut out, nodes);
        out
    }

    fn render_inline_node(&mut self, out: &mut Roff, node: &Inline) {
        match node {
            Inline::Text { text } => out.text(escape(text)),
            Inline::Styled { style, content } => self.render_styled(out, *style, content),
            Inline::Link { target, content } => self.render_link(out, target, content),
            Inline::Url { url, content } => {
                out.request_with("UR", macro_arg(url.trim()));
                self.render_inline(out, content);
                out.request("UE");
            }
            Inline::Entity { entity } => out.text(match entity {
                LiteralEntity::EnDash => "\\[en]",
                LiteralEntity::EmDash => "\\[em]",
                LiteralEntity::LeftDoubleQuote | LiteralEntity::RightDoubleQuote => "\"",
                LiteralEntity::LeftSingleQuote | LiteralEntity::RightSingleQuote => "'",
                LiteralEntity::NonBreakingSpace => " ",
            }),
            Inline::LineBreak => out.request("br"),
            Inline::Unsupported { command, payload } => {
                self.report.unsupported(command);
                out.text(escape(payload));
            }
        }
    }

    fn render_styled(&mut self, out: &mut Roff, style: Style, content: &[Inline]) {
        if plain_text(content).trim().is_empty() {
            self.render_inline(out, content);
            return;
        }
        match style {
            Style::Strikethrough => {
                self.report.unsupported("strike");
                self.render_inline(out, content);
            }
            Style::Bold | Style::Italic if !self.options.preserve_styles => {
                self.render_inline(out, content);
            }
            Style::Code => self.render_code_span(out, content),
            Style::Bold | Style::Italic => {
                self.with_font(out, style, |this, out| this.render_inline(out, content));
            }
        }
    }

    /// Switch to `style` for the duration of `body`.
    fn with_font(&mut self, out: &mut Roff, style: Style, body: impl FnOnce(&mut Self, &mut Roff)) {
        self.styles.push(style);
        out.text(format!("\\f[{}]", font(&self.styles)));
        body(self, out);
        self.styles.pop();
        out.text(format!("\\f[{}]", font(&self.styles)));
    }

    fn render_code_span(&mut self, out: &mut Roff, content: &[Inline]) {
        let simple = content
            .iter()
            .all(|node| matches!(node, Inline::Text { .. } | Inline::Entity { .. }));

        if simple {
            let raw = plain_text(content);
            let word = raw.trim();
            if self.params.iter().any(|param| *param == word) {
                self.with_font(out, Style::Italic, |_, out| out.text(escape(word)));
                return;
            }
            if is_libc_function(word) {
                self.with_font(out, Style::Bold, |_, out| out.text(escape(word)));
                out.text("(3)");
                return;
            }
        }

        let outer = std::mem::replace(&mut self.in_code, true);
        self.with_font(out, Style::Code, |this, out| this.render_inline(out, content));
        self.in_code = outer;
    }

    fn render_link(&mut self, out: &mut Roff, target: &LinkTarget, content: &[Inline]) {
        // Identifiers inside code spans stay literal.
        if self.in_code {
            self.render_inline(out, content);
            return;
        }

        let text = plain_text(content);
        let shown = text.trim();
        let index = self.index;

        match index.resolve(target) {
            Lookup::Resolved(Resolution::Entity { entity, page }) => {
                if entity.id == self.entity.id {
                    self.render_inline(out, content);
                    return;
                }
                self.stats.add_reference();
                let default_text = shown.is_empty()
                    || shown == entity.name
                    || shown == entity.display_name()
                    || shown == page.label;
                if default_text {
                    self.with_font(out, Style::Bold, |_, out| out.text(escape(&page.label)));
                    out.text(format!("({})", page.section));
                } else {
                    self.render_inline(out, content);
                }
                self.refer(entity);
            }
            Lookup::Resolved(Resolution::Member { owner, member, .. }) => {
                self.stats.add_reference();
                if shown.is_empty() || shown == member.name {
                    let style = match member.kind {
                        MemberKind::Field => Style::Italic,
                        _ => Style::Bold,
                    };
                    self.with_font(out, style, |_, out| out.text(escape(&member.name)));
                } else {
                    self.render_inline(out, content);
                }
                self.refer(owner);
            }
            Lookup::Resolved(Resolution::Example(example)) => {
                self.render_inline(out, content);
                if !self.examples.iter().any(|e| e.id == example.id) {
                    self.examples.push(example);
                }
            }
            Lookup::Ambiguous(candidates) => {
                self.report.ambiguous(&describe_target(target), candidates);
                self.render_inline(out, content);
            }
            Lookup::Unresolved => {
                self.report.unresolved(&describe_target(target));
                self.render_inline(out, content);
            }
        }
    }

    /// Record an entity for SEE ALSO. The page's own entity never is.
    pub(crate) fn refer(&mut self, entity: &'a Entity) {
        if entity.id == self.entity.id {
            return;
        }
        if !self.references.iter().any(|e| e.id == entity.id) {
            self.references.push(entity);
        }
    }
}

fn describe_target(target: &LinkTarget) -> String {
    match (&target.refid, target.name.trim()) {
        (Some(refid), "") => refid.clone(),
        (_, name) => name.to_string(),
    }
}
