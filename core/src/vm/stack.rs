use crate::Vec;
use core::fmt;

/// Why a stack operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// The operation needs more values than the stack holds.
    Underflow { needed: usize, available: usize },
    /// Pushing would grow the stack past its maximum size.
    Overflow { limit: usize },
}

/// A bounded operand stack.
///
/// This stack is used by the VM for value storage during execution. Every
/// operation is checked: popping from an empty stack or pushing past the
/// maximum size returns a [`StackError`] instead of panicking, so a faulty
/// program can never take the host process down.
///
/// Failed operations leave the stack untouched.
///
/// # Examples
///
/// ```ignore
/// use linevm_core::vm::Stack;
///
/// let mut stack = Stack::new(100);
/// stack.push(42)?;
/// stack.push(17)?;
/// assert_eq!(stack.pop(), Ok(17));
/// assert_eq!(stack.peek(), Ok(&42));
/// assert_eq!(stack.len(), 1);
/// ```
pub struct Stack<T> {
    /// The underlying storage for stack elements, bottom first.
    items: Vec<T>,
    /// Maximum allowed stack size.
    max_size: usize,
}

impl<T> Stack<T> {
    /// Creates a new stack with the specified maximum size.
    ///
    /// The stack will pre-allocate a reasonable amount of space to avoid
    /// frequent reallocations during normal operation.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use linevm_core::vm::Stack;
    ///
    /// let stack: Stack<i64> = Stack::new(1000);
    /// assert!(stack.is_empty());
    /// assert_eq!(stack.len(), 0);
    /// ```
    pub fn new(max_size: usize) -> Self {
        // Pre-allocate a reasonable amount (min of max_size or 256)
        // to avoid frequent reallocations during normal execution
        let initial_capacity = max_size.min(256);

        Self {
            items: Vec::with_capacity(initial_capacity),
            max_size,
        }
    }

    /// Pushes a value onto the stack.
    ///
    /// Returns [`StackError::Overflow`] if the stack is already at its
    /// maximum size.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use linevm_core::vm::Stack;
    ///
    /// let mut stack = Stack::new(1);
    /// assert!(stack.push(42).is_ok());
    /// assert!(stack.push(17).is_err());
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        if self.items.len() >= self.max_size {
            return Err(StackError::Overflow {
                limit: self.max_size,
            });
        }
        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the top value from the stack.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use linevm_core::vm::Stack;
    ///
    /// let mut stack = Stack::new(100);
    /// stack.push(42)?;
    /// assert_eq!(stack.pop(), Ok(42));
    /// assert!(stack.pop().is_err());
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Result<T, StackError> {
        self.items.pop().ok_or(StackError::Underflow {
            needed: 1,
            available: 0,
        })
    }

    /// Returns a reference to the top value without removing it.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use linevm_core::vm::Stack;
    ///
    /// let mut stack = Stack::new(100);
    /// stack.push(42)?;
    /// assert_eq!(stack.peek(), Ok(&42));
    /// assert_eq!(stack.len(), 1); // Value is still on the stack
    /// ```
    #[inline]
    pub fn peek(&self) -> Result<&T, StackError> {
        self.items.last().ok_or(StackError::Underflow {
            needed: 1,
            available: 0,
        })
    }

    /// Checks that at least `n` values are on the stack.
    #[inline]
    pub fn require(&self, n: usize) -> Result<(), StackError> {
        if self.items.len() < n {
            Err(StackError::Underflow {
                needed: n,
                available: self.items.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Returns the current number of elements on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes the top `n` elements from the stack and returns the last one
    /// removed (the deepest of the `n`).
    ///
    /// Returns `Ok(None)` when `n` is zero. If fewer than `n` elements are on
    /// the stack, nothing is removed and [`StackError::Underflow`] is returned.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use linevm_core::vm::Stack;
    ///
    /// let mut stack = Stack::new(100);
    /// stack.push(10)?;
    /// stack.push(20)?;
    /// stack.push(30)?;
    ///
    /// assert_eq!(stack.pop_n(2), Ok(Some(20)));
    /// assert_eq!(stack.len(), 1);
    ///
    /// // Asking for more than remaining removes nothing
    /// assert!(stack.pop_n(10).is_err());
    /// assert_eq!(stack.len(), 1);
    /// ```
    pub fn pop_n(&mut self, n: usize) -> Result<Option<T>, StackError> {
        self.require(n)?;
        if n == 0 {
            return Ok(None);
        }
        let new_len = self.items.len() - n;
        // drain() yields bottom to top; the deepest popped value is the first.
        Ok(self.items.drain(new_len..).next())
    }

    /// Returns the stack contents, bottom first.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> Stack<T> {
    /// Pushes every value in order, or none of them if they don't all fit.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use linevm_core::vm::Stack;
    ///
    /// let mut stack = Stack::new(3);
    /// stack.push_all(&[1, 2])?;
    /// assert!(stack.push_all(&[3, 4]).is_err());
    /// assert_eq!(stack.as_slice(), &[1, 2]);
    /// ```
    pub fn push_all(&mut self, values: &[T]) -> Result<(), StackError> {
        if self.items.len() + values.len() > self.max_size {
            return Err(StackError::Overflow {
                limit: self.max_size,
            });
        }
        self.items.extend_from_slice(values);
        Ok(())
    }

    /// Duplicates the top element of the stack.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use linevm_core::vm::Stack;
    ///
    /// let mut stack = Stack::new(100);
    /// stack.push(42)?;
    /// stack.dup()?;
    /// assert_eq!(stack.pop(), Ok(42));
    /// assert_eq!(stack.pop(), Ok(42));
    /// ```
    #[inline]
    pub fn dup(&mut self) -> Result<(), StackError> {
        let value = self.peek()?.clone();
        self.push(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("len", &self.items.len())
            .field("capacity", &self.max_size)
            .finish()
    }
}
