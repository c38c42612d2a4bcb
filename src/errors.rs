use std::io;

use error_chain::error_chain;

error_chain! {
    foreign_links {
        Io(io::Error);
    }

    errors {
        BadInput(whence: &'static str) {
            description("malformed operand")
            display("malformed operand: {}", whence)
        }
        OrphanHole {
            description("hole with no enclosing contour")
            display("hole with no enclosing contour")
        }
    }
}
